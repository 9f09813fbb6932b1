//! Outcome records produced for every candidate path

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Fixed reasons attached to skipped and error outcomes.
pub mod reason {
    pub const SOURCE_MISSING: &str = "source does not exist";
    pub const ALREADY_CORRECT: &str = "already correct";
    pub const LOCAL_OVERRIDE: &str = "local override preserved";
    pub const DIRECTORY_LINK_EXISTS: &str = "directory symlink already exists";
}

/// What happened to one candidate path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkAction {
    /// A new symlink was created (or would be, in dry-run)
    Created,
    /// Nothing to do, or a local entry wins
    Skipped,
    /// The path could not be handled
    Error,
}

impl fmt::Display for LinkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Skipped => write!(f, "skipped"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// The result for one candidate path.
///
/// Build through [`LinkOutcome::created`], [`LinkOutcome::skipped`] and
/// [`LinkOutcome::error`]; they keep `success` consistent with `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOutcome {
    pub source: PathBuf,
    pub target: PathBuf,
    pub success: bool,
    pub action: LinkAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LinkOutcome {
    pub fn created(source: &Path, target: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            success: true,
            action: LinkAction::Created,
            reason: None,
        }
    }

    pub fn skipped(source: &Path, target: &Path, reason: impl Into<String>) -> Self {
        Self {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            success: true,
            action: LinkAction::Skipped,
            reason: Some(reason.into()),
        }
    }

    pub fn error(source: &Path, target: &Path, reason: impl Into<String>) -> Self {
        Self {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            success: false,
            action: LinkAction::Error,
            reason: Some(reason.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.action == LinkAction::Error
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}
