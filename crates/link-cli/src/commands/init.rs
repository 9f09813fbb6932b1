//! Init command implementation

use std::path::Path;

use colored::Colorize;

use link_core::{ConfigResolver, ProjectManifest};
use link_fs::ConfigStore;
use link_git::discover;

use crate::error::{CliError, Result};

/// Run the init command
///
/// Writes a starter `.wtlink.toml` at the root of the main worktree.
pub fn run_init(cwd: &Path, force: bool) -> Result<()> {
    let set = discover(cwd)?;
    let resolver = ConfigResolver::new(set.main.path.to_native());
    let path = resolver.project_config_path();

    if path.exists() && !force {
        return Err(CliError::user(format!(
            "{} already exists. Use --force to overwrite.",
            path
        )));
    }

    ConfigStore::new().save(&path, &ProjectManifest::starter())?;
    tracing::info!(path = %path, "Wrote project config");

    println!("{} Created {}", "OK".green().bold(), path.as_str().cyan());
    println!(
        "Add directories to {} and globs to {}, then run {}.",
        "tree".bold(),
        "patterns".bold(),
        "wtlink sync".cyan()
    );
    Ok(())
}
