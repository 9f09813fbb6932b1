//! wtlink CLI
//!
//! Mirrors untracked, shared files (env files, editor settings, local
//! config) from the main git worktree into linked worktrees as symlinks.

mod cli;
mod commands;
mod error;
mod interactive;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::SyncArgs;
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
    tracing::debug!("Verbose mode enabled");
}

/// Execute the parsed command; `Ok(false)` means "completed with failures".
async fn run(cli: Cli) -> Result<bool> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Some(Commands::Sync {
            target,
            source,
            all,
            dry_run,
            json,
            no_scripts,
            concurrency,
        }) => {
            let args = SyncArgs {
                target,
                source,
                all,
                dry_run,
                json,
                no_scripts,
                concurrency,
                verbose: cli.verbose,
                user_config: cli.user_config,
            };
            commands::run_sync(&cwd, args).await
        }
        Some(Commands::List { json }) => commands::run_list(&cwd, json).map(|()| true),
        Some(Commands::Init { force }) => commands::run_init(&cwd, force).map(|()| true),
        None => {
            // No command provided - show help hint
            println!("{} Share files between git worktrees", "wtlink".green().bold());
            println!();
            println!("Run {} for available commands.", "wtlink --help".cyan());
            Ok(true)
        }
    }
}
