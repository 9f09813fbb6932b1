//! Symlink creation with reclassification of existing targets

use std::io::{self, ErrorKind};
use std::path::Path;

use link_fs::{PathInfo, inspect};
use tokio::fs;

use super::outcome::{LinkOutcome, reason};

/// What the caller already knows about the source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Nothing known; the source is probed first
    Unknown,
    /// Known to exist and not to be a directory
    File,
    /// Known to exist and to be a directory
    Directory,
}

/// Creates one symlink at a time.
///
/// Decision order for a target path:
/// 1. missing source: error
/// 2. symlink already pointing at the source: skipped
/// 3. symlink pointing elsewhere: skipped
/// 4. real file or directory: skipped, the local entry wins
/// 5. absent: created (reported only, in dry-run)
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkCreator {
    dry_run: bool,
    verbose: bool,
}

impl LinkCreator {
    pub fn new(dry_run: bool, verbose: bool) -> Self {
        Self { dry_run, verbose }
    }

    /// Decide and, outside dry-run, create the link `target -> source`.
    pub async fn link(&self, source: &Path, target: &Path, kind: SourceKind) -> LinkOutcome {
        let source_is_dir = match kind {
            SourceKind::File => false,
            SourceKind::Directory => true,
            SourceKind::Unknown => match inspect(source).await {
                Ok(info) if info.exists => info.is_dir,
                Ok(_) => return LinkOutcome::error(source, target, reason::SOURCE_MISSING),
                Err(e) => {
                    return LinkOutcome::error(source, target, format!("cannot inspect source: {e}"));
                }
            },
        };

        let info = match inspect(target).await {
            Ok(info) => info,
            Err(e) => return LinkOutcome::error(source, target, format!("cannot inspect target: {e}")),
        };
        if let Some(existing) = self.classify_existing(source, target, &info) {
            return existing;
        }

        if self.dry_run {
            tracing::debug!(source = %source.display(), link = %target.display(), "Would create symlink");
            return LinkOutcome::created(source, target);
        }

        self.create(source, target, source_is_dir).await
    }

    /// Outcome for a target that already has an entry, `None` when absent.
    fn classify_existing(&self, source: &Path, target: &Path, info: &PathInfo) -> Option<LinkOutcome> {
        if !info.exists {
            return None;
        }

        let outcome = if info.points_to(target, source) {
            LinkOutcome::skipped(source, target, reason::ALREADY_CORRECT)
        } else if info.is_symlink {
            let elsewhere = info
                .link_target
                .as_deref()
                .map(|dest| dest.display().to_string())
                .unwrap_or_default();
            LinkOutcome::skipped(source, target, format!("existing symlink points to {elsewhere}"))
        } else {
            LinkOutcome::skipped(source, target, reason::LOCAL_OVERRIDE)
        };

        diagnostic!(
            self.verbose,
            link = %target.display(),
            reason = outcome.reason().unwrap_or_default(),
            "Skipping existing entry"
        );
        Some(outcome)
    }

    async fn create(&self, source: &Path, target: &Path, source_is_dir: bool) -> LinkOutcome {
        let failure = match make_symlink(source, target, source_is_dir).await {
            Ok(()) => return self.created(source, target),
            Err(e) => e,
        };

        // One retry, only after creating a missing parent
        let failure = if failure.kind() == ErrorKind::NotFound {
            let Some(parent) = target.parent() else {
                return LinkOutcome::error(source, target, format!("failed to create symlink: {failure}"));
            };
            if let Err(e) = fs::create_dir_all(parent).await {
                return LinkOutcome::error(
                    source,
                    target,
                    format!("failed to create parent directory {}: {e}", parent.display()),
                );
            }
            match make_symlink(source, target, source_is_dir).await {
                Ok(()) => return self.created(source, target),
                Err(e) => e,
            }
        } else {
            failure
        };

        if failure.kind() == ErrorKind::AlreadyExists {
            return self.reclassify(source, target).await;
        }
        LinkOutcome::error(source, target, format!("failed to create symlink: {failure}"))
    }

    /// Something appeared at the target between the probe and the create.
    async fn reclassify(&self, source: &Path, target: &Path) -> LinkOutcome {
        tracing::debug!(link = %target.display(), "Target appeared during creation, re-probing");
        match inspect(target).await {
            Ok(info) => self.classify_existing(source, target, &info).unwrap_or_else(|| {
                LinkOutcome::error(source, target, "target changed while creating symlink")
            }),
            Err(e) => LinkOutcome::error(source, target, format!("cannot inspect target: {e}")),
        }
    }

    fn created(&self, source: &Path, target: &Path) -> LinkOutcome {
        tracing::debug!(source = %source.display(), link = %target.display(), "Created symlink");
        LinkOutcome::created(source, target)
    }
}

#[cfg(unix)]
async fn make_symlink(source: &Path, target: &Path, _source_is_dir: bool) -> io::Result<()> {
    fs::symlink(source, target).await
}

#[cfg(windows)]
async fn make_symlink(source: &Path, target: &Path, source_is_dir: bool) -> io::Result<()> {
    if source_is_dir {
        fs::symlink_dir(source, target).await
    } else {
        fs::symlink_file(source, target).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::link::LinkAction;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn setup() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.txt");
        std::fs::write(&source, "shared").unwrap();
        let target = temp.path().join("target.txt");
        (temp, source, target)
    }

    #[tokio::test]
    async fn create_over_real_file_keeps_local_entry() {
        let (_temp, source, target) = setup();
        std::fs::write(&target, "local").unwrap();

        let outcome = LinkCreator::default().create(&source, &target, false).await;

        assert_eq!(outcome.action, LinkAction::Skipped);
        assert_eq!(outcome.reason(), Some(reason::LOCAL_OVERRIDE));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "local");
    }

    #[tokio::test]
    async fn create_over_correct_link_is_already_correct() {
        let (_temp, source, target) = setup();
        std::os::unix::fs::symlink(&source, &target).unwrap();

        let outcome = LinkCreator::default().create(&source, &target, false).await;

        assert_eq!(outcome.action, LinkAction::Skipped);
        assert_eq!(outcome.reason(), Some(reason::ALREADY_CORRECT));
    }

    #[tokio::test]
    async fn create_over_foreign_link_reports_destination() {
        let (temp, source, target) = setup();
        let other = temp.path().join("other.txt");
        std::os::unix::fs::symlink(&other, &target).unwrap();

        let outcome = LinkCreator::default().create(&source, &target, false).await;

        assert_eq!(outcome.action, LinkAction::Skipped);
        assert!(outcome.reason().unwrap().contains("other.txt"));
    }

    #[tokio::test]
    async fn entry_gone_before_recheck_is_an_error() {
        let (_temp, source, target) = setup();

        let outcome = LinkCreator::default().reclassify(&source, &target).await;

        assert_eq!(outcome.action, LinkAction::Error);
        assert_eq!(outcome.reason(), Some("target changed while creating symlink"));
        assert!(std::fs::symlink_metadata(&target).is_err());
    }
}
