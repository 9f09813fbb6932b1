//! Single-probe path inspection
//!
//! Every link decision is made from one [`PathInfo`] snapshot. A regular entry
//! costs one `lstat`; a symlink costs an extra `readlink` and a `stat` on the
//! resolved target.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::path::lexical_normalize;
use crate::{Error, Result};

/// Snapshot of what sits at a path.
///
/// Not a live handle: re-probe when time has passed and races matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathInfo {
    /// An entry exists at the path (a broken symlink still exists).
    pub exists: bool,
    /// The entry itself is a symlink.
    pub is_symlink: bool,
    /// The entry is a directory; for symlinks this is the resolved target's type.
    pub is_dir: bool,
    /// Raw symlink contents, as returned by `readlink`.
    pub link_target: Option<PathBuf>,
}

impl PathInfo {
    /// Snapshot of an absent path.
    pub fn missing() -> Self {
        Self::default()
    }

    /// Whether a real (non-symlink) file or directory sits here.
    pub fn is_real(&self) -> bool {
        self.exists && !self.is_symlink
    }

    /// Absolute, lexically normalized destination of the symlink at `link_path`.
    ///
    /// Relative link contents are resolved against the link's parent directory.
    pub fn resolved_target(&self, link_path: &Path) -> Option<PathBuf> {
        let raw = self.link_target.as_ref()?;
        let joined = if raw.is_absolute() {
            raw.clone()
        } else {
            link_path
                .parent()
                .map(|parent| parent.join(raw))
                .unwrap_or_else(|| raw.clone())
        };
        Some(lexical_normalize(&joined))
    }

    /// Whether this is a symlink at `link_path` that resolves to `expected`.
    pub fn points_to(&self, link_path: &Path, expected: &Path) -> bool {
        self.is_symlink
            && self
                .resolved_target(link_path)
                .is_some_and(|target| target == lexical_normalize(expected))
    }
}

/// Probe `path` without following a final symlink.
///
/// A missing path is a normal outcome, not an error. So is a path whose parent
/// is not a directory: nothing can exist beneath a file.
///
/// # Errors
///
/// Returns [`Error::Io`] for any other failure, such as permission denied.
pub async fn inspect(path: &Path) -> Result<PathInfo> {
    let meta = match fs::symlink_metadata(path).await {
        Ok(meta) => meta,
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            return Ok(PathInfo::missing());
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    if !meta.file_type().is_symlink() {
        return Ok(PathInfo {
            exists: true,
            is_symlink: false,
            is_dir: meta.is_dir(),
            link_target: None,
        });
    }

    let link_target = fs::read_link(path).await.map_err(|e| Error::io(path, e))?;
    // A dangling link resolves to nothing, which is not a directory.
    let is_dir = fs::metadata(path)
        .await
        .map(|target_meta| target_meta.is_dir())
        .unwrap_or(false);

    Ok(PathInfo {
        exists: true,
        is_symlink: true,
        is_dir,
        link_target: Some(link_target),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_info(raw: &str) -> PathInfo {
        PathInfo {
            exists: true,
            is_symlink: true,
            is_dir: false,
            link_target: Some(PathBuf::from(raw)),
        }
    }

    #[test]
    fn resolved_target_keeps_absolute_links() {
        let info = link_info("/src/conf/a.txt");
        assert_eq!(
            info.resolved_target(Path::new("/dst/conf/a.txt")),
            Some(PathBuf::from("/src/conf/a.txt"))
        );
    }

    #[test]
    fn resolved_target_joins_relative_links_to_parent() {
        let info = link_info("../../src/conf/a.txt");
        assert_eq!(
            info.resolved_target(Path::new("/dst/conf/a.txt")),
            Some(PathBuf::from("/src/conf/a.txt"))
        );
    }

    #[test]
    fn points_to_ignores_dot_segments() {
        let info = link_info("/src/./conf/a.txt");
        assert!(info.points_to(Path::new("/dst/conf/a.txt"), Path::new("/src/conf/a.txt")));
        assert!(!info.points_to(Path::new("/dst/conf/a.txt"), Path::new("/src/conf/b.txt")));
    }

    #[test]
    fn real_entries_never_point_anywhere() {
        let info = PathInfo {
            exists: true,
            is_symlink: false,
            is_dir: true,
            link_target: None,
        };
        assert!(info.is_real());
        assert!(!info.points_to(Path::new("/dst/conf"), Path::new("/src/conf")));
    }
}
