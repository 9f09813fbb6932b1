//! Recursive tree mirroring
//!
//! A tree rule mirrors a source directory into the target leaf by leaf. Real
//! directories in the target are descended into rather than replaced, so
//! local files inside them survive while missing siblings are still linked.
//!
//! Traversal runs off an explicit work queue. Each unit (probe a root, list a
//! directory, probe a subdirectory target, link a file) yields its outcomes
//! and any follow-up units; at most `concurrency` units are in flight.
//!
//! When the target root lives inside the source, that subtree is pruned so a
//! target is never mirrored into itself.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use futures::stream::{FuturesUnordered, StreamExt};
use link_fs::inspect;
use tokio::fs;

use crate::exclude::ExclusionMatcher;
use crate::link::{LinkCreator, LinkOutcome, SourceKind, reason};

/// One queued piece of traversal, addressed relative to both roots.
#[derive(Debug)]
enum TreeWork {
    /// A tree rule's root: may be a directory, a file, or missing
    Root(PathBuf),
    /// A source directory whose target counterpart has not been probed
    Subdirectory(PathBuf),
    /// A source directory to list
    Listing(PathBuf),
    /// A source leaf to link
    Leaf(PathBuf),
}

/// A directory entry as read from the source.
#[derive(Debug)]
struct Listed {
    name: OsString,
    is_dir: io::Result<bool>,
}

#[derive(Debug, Default)]
struct Step {
    outcomes: Vec<LinkOutcome>,
    follow_up: Vec<TreeWork>,
}

impl Step {
    fn outcome(outcome: LinkOutcome) -> Self {
        Self {
            outcomes: vec![outcome],
            follow_up: Vec::new(),
        }
    }

    fn then(work: TreeWork) -> Self {
        Self {
            outcomes: Vec::new(),
            follow_up: vec![work],
        }
    }
}

/// Mirrors tree rules from a source root into a target root.
pub struct TreeSynchronizer<'a> {
    source_root: &'a Path,
    target_root: &'a Path,
    matcher: &'a ExclusionMatcher,
    creator: LinkCreator,
    concurrency: usize,
    verbose: bool,
    pruned: Option<&'a Path>,
}

impl<'a> TreeSynchronizer<'a> {
    pub fn new(
        source_root: &'a Path,
        target_root: &'a Path,
        matcher: &'a ExclusionMatcher,
        creator: LinkCreator,
    ) -> Self {
        Self {
            source_root,
            target_root,
            matcher,
            creator,
            concurrency: crate::DEFAULT_CONCURRENCY,
            verbose: false,
            pruned: None,
        }
    }

    /// Skip `relative` (a path under the source root) and everything below it.
    pub fn with_pruned(mut self, relative: Option<&'a Path>) -> Self {
        self.pruned = relative.filter(|rel| !rel.as_os_str().is_empty());
        self
    }

    /// Maximum number of traversal units in flight.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Mirror every relative root, returning all outcomes in completion order.
    pub async fn sync<P: AsRef<Path>>(&self, roots: &[P]) -> Vec<LinkOutcome> {
        let mut queue: VecDeque<TreeWork> = roots
            .iter()
            .map(|root| TreeWork::Root(root.as_ref().to_path_buf()))
            .collect();
        let mut in_flight = FuturesUnordered::new();
        let mut outcomes = Vec::new();

        loop {
            while in_flight.len() < self.concurrency {
                let Some(work) = queue.pop_front() else {
                    break;
                };
                in_flight.push(self.process(work));
            }

            let Some(step) = in_flight.next().await else {
                break;
            };
            outcomes.extend(step.outcomes);
            queue.extend(step.follow_up);
        }

        outcomes
    }

    async fn process(&self, work: TreeWork) -> Step {
        match work {
            TreeWork::Root(rel) => self.visit_root(rel).await,
            TreeWork::Subdirectory(rel) => self.visit_subdirectory(rel).await,
            TreeWork::Listing(rel) => self.list(rel).await,
            TreeWork::Leaf(rel) => {
                let (source, target) = self.pair(&rel);
                Step::outcome(self.creator.link(&source, &target, SourceKind::File).await)
            }
        }
    }

    async fn visit_root(&self, rel: PathBuf) -> Step {
        let (source, target) = self.pair(&rel);
        if self.is_pruned(&rel) {
            diagnostic!(self.verbose, source = %source.display(), "Tree root lies inside the target, skipping");
            return Step::default();
        }
        match inspect(&source).await {
            Ok(info) if !info.exists => {
                diagnostic!(self.verbose, source = %source.display(), "Tree source missing, nothing to mirror");
                Step::default()
            }
            Ok(info) if info.is_dir => Step::then(TreeWork::Subdirectory(rel)),
            Ok(_) => Step::outcome(self.creator.link(&source, &target, SourceKind::File).await),
            Err(e) => Step::outcome(LinkOutcome::error(
                &source,
                &target,
                format!("cannot inspect source: {e}"),
            )),
        }
    }

    /// Decide whether a source directory's target counterpart is descended into.
    async fn visit_subdirectory(&self, rel: PathBuf) -> Step {
        let (source, target) = self.pair(&rel);
        let info = match inspect(&target).await {
            Ok(info) => info,
            Err(e) => {
                return Step::outcome(LinkOutcome::error(
                    &source,
                    &target,
                    format!("cannot inspect target: {e}"),
                ));
            }
        };

        if info.points_to(&target, &source) {
            diagnostic!(self.verbose, link = %target.display(), "Directory already linked");
            return Step::outcome(LinkOutcome::skipped(
                &source,
                &target,
                reason::DIRECTORY_LINK_EXISTS,
            ));
        }
        if info.is_real() && !info.is_dir {
            diagnostic!(self.verbose, link = %target.display(), "Local file shadows source directory");
            return Step::outcome(LinkOutcome::skipped(&source, &target, reason::LOCAL_OVERRIDE));
        }

        diagnostic!(self.verbose, path = %rel.display(), "Recursing into directory");
        Step::then(TreeWork::Listing(rel))
    }

    async fn list(&self, rel: PathBuf) -> Step {
        let (source, _) = self.pair(&rel);
        let mut entries = match fs::read_dir(&source).await {
            Ok(entries) => entries,
            Err(e) => return self.plan_listing(&rel, Vec::new(), Some(e)),
        };

        let mut listed = Vec::new();
        let failure = loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    // Source-side symlinks are leaves, never followed
                    let is_dir = entry.file_type().await.map(|file_type| file_type.is_dir());
                    listed.push(Listed {
                        name: entry.file_name(),
                        is_dir,
                    });
                }
                Ok(None) => break None,
                Err(e) => break Some(e),
            }
        };
        self.plan_listing(&rel, listed, failure)
    }

    /// Turn one directory listing into follow-up work.
    ///
    /// Entries read before a listing failure are still mirrored; the failure
    /// itself becomes one error outcome for the directory.
    fn plan_listing(&self, rel: &Path, listed: Vec<Listed>, failure: Option<io::Error>) -> Step {
        let mut step = Step::default();
        for entry in listed {
            let child = rel.join(&entry.name);
            if self.is_pruned(&child) {
                diagnostic!(self.verbose, path = %child.display(), "Target root, not mirrored");
                continue;
            }
            if self.matcher.is_excluded(&child) {
                diagnostic!(self.verbose, path = %child.display(), "Excluded");
                continue;
            }

            match entry.is_dir {
                Ok(true) => step.follow_up.push(TreeWork::Subdirectory(child)),
                Ok(false) => step.follow_up.push(TreeWork::Leaf(child)),
                Err(e) => {
                    let (source, target) = self.pair(&child);
                    step.outcomes
                        .push(LinkOutcome::error(&source, &target, format!("cannot read entry type: {e}")));
                }
            }
        }

        if let Some(e) = failure {
            let (source, target) = self.pair(rel);
            step.outcomes
                .push(LinkOutcome::error(&source, &target, format!("failed to list directory: {e}")));
        }
        step
    }

    fn is_pruned(&self, rel: &Path) -> bool {
        self.pruned.is_some_and(|pruned| rel.starts_with(pruned))
    }

    fn pair(&self, rel: &Path) -> (PathBuf, PathBuf) {
        if rel.as_os_str().is_empty() {
            return (self.source_root.to_path_buf(), self.target_root.to_path_buf());
        }
        (self.source_root.join(rel), self.target_root.join(rel))
    }
}
