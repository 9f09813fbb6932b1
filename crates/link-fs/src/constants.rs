//! Well-known file and directory names.

use std::path::Path;

/// Files and directories wtlink looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPath {
    /// Project configuration at the source root
    ProjectConfig,
    /// Application directory under the platform config dir
    UserConfigDir,
    /// User configuration file inside [`LinkPath::UserConfigDir`]
    UserConfigFile,
    /// Git metadata entry (directory in the main worktree, file in linked ones)
    GitEntry,
}

impl LinkPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectConfig => ".wtlink.toml",
            Self::UserConfigDir => "wtlink",
            Self::UserConfigFile => "config.toml",
            Self::GitEntry => ".git",
        }
    }
}

impl AsRef<Path> for LinkPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for LinkPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for LinkPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
