//! Error types for link-core

use std::path::PathBuf;

/// Result type for link-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in link-core operations
///
/// Per-path failures during a run never surface here; they become
/// [`LinkOutcome`](crate::LinkOutcome) entries instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A glob pattern (rule or exclusion) failed to compile
    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A rule is structurally invalid (absolute path, `..`, empty)
    #[error("Invalid rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    /// Configuration values are out of range or inconsistent
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A source or target root cannot be used for a run
    #[error("Invalid root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    /// A required post-link script failed
    #[error("Script '{command}' failed: {message}")]
    ScriptFailed { command: String, message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from link-fs
    #[error(transparent)]
    Fs(#[from] link_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
