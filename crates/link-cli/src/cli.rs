//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// wtlink - Share untracked files between git worktrees as symlinks
#[derive(Parser, Debug)]
#[command(name = "wtlink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// User config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "WTLINK_USER_CONFIG", value_name = "FILE")]
    pub user_config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Link shared files from the main worktree into a linked worktree
    ///
    /// Examples:
    ///   wtlink sync                    # Current worktree, or pick one
    ///   wtlink sync feature-a          # By branch or directory name
    ///   wtlink sync --all --dry-run    # Preview every linked worktree
    Sync {
        /// Target worktree: a path, branch, or worktree name
        target: Option<String>,

        /// Source directory (defaults to the main worktree)
        #[arg(long, value_name = "DIR")]
        source: Option<PathBuf>,

        /// Link into every linked worktree
        #[arg(long, conflicts_with = "target")]
        all: bool,

        /// Report what would happen without creating links
        #[arg(long)]
        dry_run: bool,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,

        /// Skip post-link scripts
        #[arg(long)]
        no_scripts: bool,

        /// Maximum concurrent filesystem operations
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,
    },

    /// List worktrees of the current repository
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Create a starter .wtlink.toml in the main worktree
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}
