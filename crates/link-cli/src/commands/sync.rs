//! Sync command implementation
//!
//! Resolves the source and target worktrees, runs the link engine for each
//! target, prints the report and runs post-link scripts.

use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;

use link_core::{
    ConfigResolver, ExclusionCompiler, LinkAction, LinkEngine, ResolvedConfig, ScriptContext,
    SyncOptions, SyncReport, run_scripts,
};
use link_fs::canonical_root;
use link_git::{WorktreeSet, discover};

use crate::error::{CliError, Result};
use crate::interactive;

/// Arguments of `wtlink sync`
#[derive(Debug, Clone, Default)]
pub struct SyncArgs {
    pub target: Option<String>,
    pub source: Option<PathBuf>,
    pub all: bool,
    pub dry_run: bool,
    pub json: bool,
    pub no_scripts: bool,
    pub concurrency: Option<usize>,
    pub verbose: bool,
    pub user_config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct TargetReport<'a> {
    source: &'a Path,
    target: &'a Path,
    #[serde(flatten)]
    report: &'a SyncReport,
    scripts_failed: bool,
}

/// Run the sync command
///
/// Returns `Ok(false)` when any outcome is an error or a required script
/// failed; the caller turns that into a non-zero exit status.
pub async fn run_sync(cwd: &Path, args: SyncArgs) -> Result<bool> {
    let (source, targets) = resolve_roots(cwd, &args)?;

    let mut resolver = ConfigResolver::new(&source);
    if let Some(path) = &args.user_config {
        resolver = resolver.with_user_config(Some(path.clone()));
    }
    if !resolver.has_project_config() && !args.json {
        println!(
            "{} No {} in {}. Run {} to create one.",
            "!".yellow().bold(),
            link_fs::LinkPath::ProjectConfig,
            source.display(),
            "wtlink init".cyan()
        );
    }
    let config = resolver.resolve()?;
    let exclusions = config.exclusions(&ExclusionCompiler::default())?;
    let options = SyncOptions::default()
        .dry_run(args.dry_run)
        .verbose(args.verbose)
        .concurrency(args.concurrency.unwrap_or(config.concurrency));

    let mut all_ok = true;
    let mut results = Vec::with_capacity(targets.len());
    for target in &targets {
        if !args.json {
            println!(
                "{} Linking {} {} {}{}",
                "=>".blue().bold(),
                source.display(),
                "->".dimmed(),
                target.display(),
                if args.dry_run { " (dry run)".yellow().to_string() } else { String::new() }
            );
        }

        let engine = LinkEngine::new(&source, target, &config.rules, exclusions.clone(), options)?;
        let report = SyncReport::from_outcomes(engine.run().await, args.dry_run);
        if !args.json {
            print_report(target, &report, args.verbose);
        }

        let scripts_failed = report.success() && !args.no_scripts && !run_post_link(&config, &source, target, &args);
        all_ok &= report.success() && !scripts_failed;
        results.push((target, report, scripts_failed));
    }

    if args.json {
        let json: Vec<TargetReport<'_>> = results
            .iter()
            .map(|(target, report, scripts_failed)| TargetReport {
                source: &source,
                target,
                report,
                scripts_failed: *scripts_failed,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
    }

    Ok(all_ok)
}

/// Pick the source root and every target root for this invocation.
fn resolve_roots(cwd: &Path, args: &SyncArgs) -> Result<(PathBuf, Vec<PathBuf>)> {
    // Git is only consulted when something has to be inferred
    let worktrees = if args.source.is_none() || args.target.is_none() {
        Some(discover(cwd)?)
    } else {
        None
    };

    let source = match (&args.source, &worktrees) {
        (Some(dir), _) => existing_dir(&cwd.join(dir))?,
        (None, Some(set)) => set.main.path.to_native(),
        (None, None) => return Err(CliError::user("Cannot determine the source worktree")),
    };

    let targets = match (&args.target, &worktrees) {
        (Some(target), set) => vec![resolve_named_target(cwd, target, set.as_ref())?],
        (None, Some(set)) if args.all => {
            if set.linked.is_empty() {
                return Err(CliError::user("No linked worktrees found"));
            }
            set.linked.iter().map(|wt| wt.path.to_native()).collect()
        }
        (None, Some(set)) => vec![infer_target(cwd, set)?],
        (None, None) => return Err(CliError::user("Cannot determine the target worktree")),
    };

    tracing::debug!(source = %source.display(), targets = targets.len(), "Resolved roots");
    Ok((source, targets))
}

/// A target given on the command line: a directory, or a worktree name.
fn resolve_named_target(cwd: &Path, target: &str, worktrees: Option<&WorktreeSet>) -> Result<PathBuf> {
    let as_path = cwd.join(target);
    if as_path.is_dir() {
        return existing_dir(&as_path);
    }
    match worktrees {
        Some(set) => Ok(set.find_linked(target)?.path.to_native()),
        None => Err(CliError::user(format!("Target directory not found: {target}"))),
    }
}

/// The linked worktree containing `cwd`, otherwise an interactive choice.
fn infer_target(cwd: &Path, set: &WorktreeSet) -> Result<PathBuf> {
    if let Some(current) = set.containing(cwd).filter(|wt| !wt.is_main) {
        return Ok(current.path.to_native());
    }
    let candidates: Vec<_> = set.linked.iter().collect();
    interactive::select_worktree(&candidates)
}

fn existing_dir(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(CliError::user(format!("Not a directory: {}", path.display())));
    }
    Ok(canonical_root(path)?)
}

/// Run post-link scripts; `true` when none failed fatally.
fn run_post_link(config: &ResolvedConfig, source: &Path, target: &Path, args: &SyncArgs) -> bool {
    if config.scripts.is_empty() {
        return true;
    }

    if args.dry_run {
        if !args.json {
            println!("{} Would run scripts:", "=>".blue().bold());
            for script in &config.scripts {
                println!("   {} {}", "$".dimmed(), script.display_line());
            }
        }
        return true;
    }

    let context = ScriptContext::for_link(source, target).with_stdout_to_stderr(args.json);
    match run_scripts(&config.scripts, &context, target) {
        Ok(results) => {
            tracing::debug!(count = results.len(), "Post-link scripts finished");
            true
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            false
        }
    }
}

fn print_report(target: &Path, report: &SyncReport, verbose: bool) {
    for outcome in &report.outcomes {
        let show = verbose || outcome.action != LinkAction::Skipped;
        if !show {
            continue;
        }
        let shown = outcome
            .target
            .strip_prefix(target)
            .unwrap_or(&outcome.target)
            .display();
        let reason = outcome.reason().map(|r| format!(" ({r})")).unwrap_or_default();
        match outcome.action {
            LinkAction::Created => println!("   {} {}", "+".green(), shown),
            LinkAction::Skipped => println!("   {} {}{}", "=".dimmed(), shown, reason.dimmed()),
            LinkAction::Error => println!("   {} {}{}", "!".red(), shown, reason.red()),
        }
    }

    let created_label = if report.dry_run { "would create" } else { "created" };
    let summary = format!(
        "{} {}, {} skipped, {} errors",
        report.created, created_label, report.skipped, report.errors
    );
    if report.success() {
        println!("{} {}", "OK".green().bold(), summary);
    } else {
        println!("{} {}", "FAILED".red().bold(), summary);
    }
}
