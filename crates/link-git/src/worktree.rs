//! Worktree enumeration through git2

use std::path::Path;

use git2::{ErrorCode, Repository};
use link_fs::{NormalizedPath, canonical_root};

use crate::{Error, Result};

/// Information about a worktree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeInfo {
    /// Worktree name (`main` for the primary checkout, git's name otherwise)
    pub name: String,

    /// Canonical filesystem path to the worktree
    pub path: NormalizedPath,

    /// Branch checked out in this worktree, or `HEAD` when detached
    pub branch: String,

    /// Whether this is the main/primary worktree
    pub is_main: bool,
}

/// The main worktree and all linked worktrees of one repository.
#[derive(Debug, Clone)]
pub struct WorktreeSet {
    /// The primary checkout that owns the git database
    pub main: WorktreeInfo,
    /// Linked worktrees, in git's listing order
    pub linked: Vec<WorktreeInfo>,
}

impl WorktreeSet {
    /// Main worktree first, then every linked worktree.
    pub fn all(&self) -> impl Iterator<Item = &WorktreeInfo> {
        std::iter::once(&self.main).chain(self.linked.iter())
    }

    /// The worktree whose directory contains `path`, preferring the deepest match.
    ///
    /// Linked worktrees may live inside the main checkout, so the longest
    /// matching root wins.
    pub fn containing(&self, path: &Path) -> Option<&WorktreeInfo> {
        let probe = NormalizedPath::new(canonical_root(path).unwrap_or_else(|_| path.to_path_buf()));
        self.all()
            .filter(|wt| probe.relative_to(&wt.path).is_some())
            .max_by_key(|wt| wt.path.as_str().len())
    }

    /// Find a linked worktree by git name, branch, or directory name.
    pub fn find_linked(&self, name: &str) -> Result<&WorktreeInfo> {
        self.linked
            .iter()
            .find(|wt| wt.name == name || wt.branch == name || wt.path.file_name() == Some(name))
            .ok_or_else(|| Error::WorktreeNotFound {
                name: name.to_string(),
            })
    }
}

/// Discover the repository containing `path` and enumerate its worktrees.
///
/// Works from the main checkout or from inside any linked worktree.
///
/// # Errors
///
/// Returns [`Error::NotARepository`] when no repository contains `path`, and
/// [`Error::BareRepository`] when the repository has no main working directory.
pub fn discover(path: &Path) -> Result<WorktreeSet> {
    let repo = Repository::discover(path).map_err(|e| match e.code() {
        ErrorCode::NotFound => Error::NotARepository {
            path: path.to_path_buf(),
        },
        _ => Error::Git(e),
    })?;

    // Linked worktrees share the main repository's common directory
    let main_repo = Repository::open(repo.commondir())?;
    let main_dir = main_repo
        .workdir()
        .ok_or_else(|| Error::BareRepository {
            path: repo.commondir().to_path_buf(),
        })?
        .to_path_buf();

    let main = WorktreeInfo {
        name: "main".to_string(),
        path: NormalizedPath::new(canonical_root(&main_dir)?),
        branch: head_branch(&main_repo),
        is_main: true,
    };

    let mut linked = Vec::new();
    for name in main_repo.worktrees()?.iter().flatten() {
        let wt = main_repo.find_worktree(name)?;
        let wt_path = wt.path();

        // A pruned-but-registered worktree has no directory left to sync into
        if !wt_path.is_dir() {
            tracing::warn!(worktree = name, path = %wt_path.display(), "Skipping missing worktree");
            continue;
        }

        let wt_repo = Repository::open(wt_path)?;
        linked.push(WorktreeInfo {
            name: name.to_string(),
            path: NormalizedPath::new(canonical_root(wt_path)?),
            branch: head_branch(&wt_repo),
            is_main: false,
        });
    }

    tracing::debug!(main = %main.path, linked = linked.len(), "Discovered worktrees");
    Ok(WorktreeSet { main, linked })
}

fn head_branch(repo: &Repository) -> String {
    repo.head()
        .ok()
        .filter(|head| head.is_branch())
        .and_then(|head| head.shorthand().map(String::from))
        .unwrap_or_else(|| "HEAD".into())
}
