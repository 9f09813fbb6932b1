//! [`TestTree`] builder for link scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary `source/` + `target/` directory pair.
///
/// Both roots are canonicalized so link targets compare equal to the paths the
/// engine computes, even where the temp dir sits behind a symlink.
///
/// # Example
///
/// ```rust,no_run
/// use link_test_utils::tree::TestTree;
///
/// let tree = TestTree::new();
/// tree.write_source("conf/a.txt", "a");
/// tree.write_target("conf/b.txt", "local");
/// tree.assert_real_file("conf/b.txt", "local");
/// ```
pub struct TestTree {
    _temp_dir: TempDir,
    source: PathBuf,
    target: PathBuf,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create empty `source/` and `target/` directories.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir
            .path()
            .canonicalize()
            .unwrap_or_else(|e| panic!("TestTree::new: failed to canonicalize temp dir: {e}"));
        let source = root.join("source");
        let target = root.join("target");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&target).unwrap();
        Self {
            _temp_dir: temp_dir,
            source,
            target,
        }
    }

    /// Absolute source root.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Absolute target root.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Write a file under the source root, creating parents.
    pub fn write_source(&self, rel: &str, content: &str) -> PathBuf {
        write_with_parents(&self.source.join(rel), content)
    }

    /// Create a directory (and parents) under the source root.
    pub fn mkdir_source(&self, rel: &str) -> PathBuf {
        let path = self.source.join(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Write a real file under the target root, creating parents.
    pub fn write_target(&self, rel: &str, content: &str) -> PathBuf {
        write_with_parents(&self.target.join(rel), content)
    }

    /// Create a real directory (and parents) under the target root.
    pub fn mkdir_target(&self, rel: &str) -> PathBuf {
        let path = self.target.join(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Place a symlink at `target/rel` pointing at `dest`.
    #[cfg(unix)]
    pub fn symlink_target(&self, rel: &str, dest: &Path) -> PathBuf {
        let path = self.target.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        std::os::unix::fs::symlink(dest, &path).unwrap();
        path
    }

    /// Assert `target/rel` is a symlink pointing at `source/rel`.
    ///
    /// # Panics
    /// Panics with a descriptive message otherwise.
    pub fn assert_link(&self, rel: &str) {
        let link = self.target.join(rel);
        let meta = fs::symlink_metadata(&link)
            .unwrap_or_else(|_| panic!("Expected symlink at {}", link.display()));
        assert!(
            meta.file_type().is_symlink(),
            "Expected symlink, found real entry: {}",
            link.display()
        );
        let dest = fs::read_link(&link).unwrap();
        assert_eq!(
            dest,
            self.source.join(rel),
            "Symlink {} points to the wrong place",
            link.display()
        );
    }

    /// Assert `target/rel` is a real file with exactly `content`.
    ///
    /// # Panics
    /// Panics if the entry is a symlink, missing, or has other content.
    pub fn assert_real_file(&self, rel: &str, content: &str) {
        let path = self.target.join(rel);
        let meta = fs::symlink_metadata(&path)
            .unwrap_or_else(|_| panic!("Expected real file at {}", path.display()));
        assert!(
            meta.file_type().is_file(),
            "Expected real file, found {:?}: {}",
            meta.file_type(),
            path.display()
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    /// Assert nothing (not even a dangling link) exists at `target/rel`.
    ///
    /// # Panics
    /// Panics if an entry exists.
    pub fn assert_absent(&self, rel: &str) {
        let path = self.target.join(rel);
        assert!(
            fs::symlink_metadata(&path).is_err(),
            "Expected nothing at {}",
            path.display()
        );
    }
}

fn write_with_parents(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.to_path_buf()
}
