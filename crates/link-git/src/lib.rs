//! Git worktree discovery for wtlink
//!
//! Finds the main worktree (the default sync source) and every linked worktree
//! (candidate sync targets) of the repository containing a given path.

pub mod error;
pub mod worktree;

pub use error::{Error, Result};
pub use worktree::{WorktreeInfo, WorktreeSet, discover};
