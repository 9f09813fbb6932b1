//! Shared test utilities for the wtlink workspace.
//!
//! Dev-dependency only — never published.
//!
//! # Modules
//!
//! - [`git`] — git repositories with linked worktrees, driven through the `git` CLI
//! - [`tree`] — [`tree::TestTree`], a source/target directory pair for link scenarios

pub mod git;
pub mod tree;
