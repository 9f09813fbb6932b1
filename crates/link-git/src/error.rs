//! Error types for link-git

use std::path::PathBuf;

/// Result type for link-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in link-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] link_fs::Error),

    #[error("Not inside a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Repository at {path} is bare and has no main worktree")]
    BareRepository { path: PathBuf },

    #[error("Worktree '{name}' not found")]
    WorktreeNotFound { name: String },
}
