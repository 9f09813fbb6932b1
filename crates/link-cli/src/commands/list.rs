//! List command implementation

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use link_git::discover;

use crate::error::Result;

#[derive(Debug, Serialize)]
struct WorktreeEntry<'a> {
    name: &'a str,
    path: &'a str,
    branch: &'a str,
    is_main: bool,
    current: bool,
}

/// Run the list command
pub fn run_list(cwd: &Path, json: bool) -> Result<()> {
    let set = discover(cwd)?;
    let current = set.containing(cwd).map(|wt| wt.path.clone());

    let entries: Vec<WorktreeEntry<'_>> = set
        .all()
        .map(|wt| WorktreeEntry {
            name: &wt.name,
            path: wt.path.as_str(),
            branch: &wt.branch,
            is_main: wt.is_main,
            current: current.as_ref() == Some(&wt.path),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        let marker = if entry.current { "*".green().bold() } else { " ".normal() };
        let role = if entry.is_main {
            "main".cyan().to_string()
        } else {
            "linked".dimmed().to_string()
        };
        println!("{} {:<24} {:<8} {}", marker, entry.branch, role, entry.path.dimmed());
    }
    if set.linked.is_empty() {
        println!();
        println!("No linked worktrees. Create one with {}.", "git worktree add".cyan());
    }

    Ok(())
}
