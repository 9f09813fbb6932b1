//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for terminal-based interactive selection.

use std::io::IsTerminal;
use std::path::PathBuf;

use colored::Colorize;
use dialoguer::Select;
use link_git::WorktreeInfo;

use crate::error::{CliError, Result};

/// Ask which linked worktree to sync into.
///
/// Fails instead of prompting when stdin is not a terminal.
pub fn select_worktree(candidates: &[&WorktreeInfo]) -> Result<PathBuf> {
    if candidates.is_empty() {
        return Err(CliError::user(
            "No linked worktrees found. Create one with `git worktree add`.",
        ));
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::user(
            "No target given and not running in a terminal. Pass a worktree or --all.",
        ));
    }

    let items: Vec<String> = candidates
        .iter()
        .map(|wt| format!("{}  {}", wt.branch, wt.path.as_str().dimmed()))
        .collect();

    println!();
    let index = Select::new()
        .with_prompt("Link into which worktree?")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(candidates[index].path.to_native())
}
