//! Git repository fixtures.
//!
//! These shell out to the `git` CLI so the fixtures match what users create by
//! hand, including the `.git` file that marks a linked worktree.

use std::fs;
use std::path::Path;
use std::process::Command;

fn run_git(cwd: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .unwrap_or_else(|e| panic!("failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "`git {args:?}` failed in {}:\n{}",
            cwd.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Initialises a real git repository with an initial commit on `main`.
///
/// Specifically:
/// - Runs `git init`
/// - Configures `user.email`, `user.name`, and `commit.gpgsign = false`
/// - Creates `README.md` and makes an initial commit
/// - Renames the default branch to `main`
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    run_git(path, &["init"]);
    run_git(path, &["config", "user.email", "test@test.com"]);
    run_git(path, &["config", "user.name", "Test User"]);
    run_git(path, &["config", "commit.gpgsign", "false"]);

    fs::write(path.join("README.md"), "# Test")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));

    run_git(path, &["add", "."]);
    run_git(path, &["commit", "-m", "Initial commit"]);
    // Best-effort: older git versions may not support this flag
    let _ = Command::new("git")
        .args(["branch", "-m", "main"])
        .current_dir(path)
        .output();
}

/// Adds a linked worktree at `worktree_path` on a new branch `branch`.
///
/// # Panics
/// Panics if `git worktree add` fails.
pub fn add_worktree(repo: &Path, worktree_path: &Path, branch: &str) {
    let target = worktree_path.to_string_lossy();
    run_git(repo, &["worktree", "add", "-b", branch, &target]);
}
