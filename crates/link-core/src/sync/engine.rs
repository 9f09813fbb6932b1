//! The link engine

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::exclude::ExclusionMatcher;
use crate::limiter::{ConcurrencyLimiter, DEFAULT_CONCURRENCY};
use crate::link::{LinkCreator, LinkOutcome, SourceKind};
use crate::pattern::{CompiledPattern, PatternCollector, PatternMatch, resolve_conflicts};
use crate::rules::RuleSet;
use crate::tree::TreeSynchronizer;
use crate::{Error, Result};

/// Flags for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Report decisions without creating anything
    pub dry_run: bool,
    /// Promote skip and recursion diagnostics from DEBUG to INFO
    pub verbose: bool,
    /// Maximum in-flight filesystem tasks
    pub concurrency: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            verbose: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl SyncOptions {
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Mirrors a rule set from a source root into a target root.
///
/// Rules and exclusions are validated when the engine is built, so [`run`]
/// never fails as a whole: every per-path problem is one error outcome.
///
/// [`run`]: LinkEngine::run
#[derive(Debug)]
pub struct LinkEngine {
    source_root: PathBuf,
    target_root: PathBuf,
    /// Target root relative to the source, when the target is nested inside it
    nested_target: Option<PathBuf>,
    tree_roots: Vec<PathBuf>,
    patterns: Vec<CompiledPattern>,
    exclusions: Arc<ExclusionMatcher>,
    options: SyncOptions,
}

impl LinkEngine {
    /// Build an engine for absolute `source_root` and `target_root`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRoot`] when a root is relative, both are the same, or
    ///   the source lies inside the target
    /// - [`Error::InvalidPattern`] when a pattern rule does not compile
    /// - [`Error::InvalidConfig`] when `concurrency` is zero
    pub fn new(
        source_root: &Path,
        target_root: &Path,
        rules: &RuleSet,
        exclusions: ExclusionMatcher,
        options: SyncOptions,
    ) -> Result<Self> {
        for root in [source_root, target_root] {
            if !root.is_absolute() {
                return Err(Error::InvalidRoot {
                    path: root.to_path_buf(),
                    reason: "path must be absolute".into(),
                });
            }
        }
        let source = link_fs::lexical_normalize(source_root);
        let target = link_fs::lexical_normalize(target_root);
        if source == target {
            return Err(Error::InvalidRoot {
                path: target_root.to_path_buf(),
                reason: "source and target are the same directory".into(),
            });
        }
        if source.starts_with(&target) {
            return Err(Error::InvalidRoot {
                path: source_root.to_path_buf(),
                reason: "source lies inside the target".into(),
            });
        }
        let nested_target = target.strip_prefix(&source).ok().map(Path::to_path_buf);
        if let Some(nested) = &nested_target {
            tracing::debug!(path = %nested.display(), "Target is nested in source, pruning it");
        }
        if options.concurrency == 0 {
            return Err(Error::InvalidConfig {
                message: "concurrency must be at least 1".into(),
            });
        }

        let patterns = rules
            .patterns()
            .map(CompiledPattern::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            source_root: source_root.to_path_buf(),
            target_root: target_root.to_path_buf(),
            nested_target,
            tree_roots: rules.tree_paths().map(Path::to_path_buf).collect(),
            patterns,
            exclusions: Arc::new(exclusions),
            options,
        })
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Run every tree rule, then every pattern rule.
    ///
    /// Returns tree outcomes followed by pattern outcomes. Individual failures
    /// never abort the run.
    pub async fn run(&self) -> Vec<LinkOutcome> {
        tracing::info!(
            source = %self.source_root.display(),
            target = %self.target_root.display(),
            trees = self.tree_roots.len(),
            patterns = self.patterns.len(),
            dry_run = self.options.dry_run,
            "Starting link run"
        );

        let mut outcomes = self.link_trees().await;
        outcomes.extend(self.link_patterns().await);

        tracing::info!(outcomes = outcomes.len(), "Link run finished");
        outcomes
    }

    async fn link_trees(&self) -> Vec<LinkOutcome> {
        if self.tree_roots.is_empty() {
            return Vec::new();
        }
        TreeSynchronizer::new(&self.source_root, &self.target_root, &self.exclusions, self.creator())
            .with_concurrency(self.options.concurrency)
            .with_verbose(self.options.verbose)
            .with_pruned(self.nested_target.as_deref())
            .sync(&self.tree_roots)
            .await
    }

    async fn link_patterns(&self) -> Vec<LinkOutcome> {
        if self.patterns.is_empty() {
            return Vec::new();
        }

        let limiter = ConcurrencyLimiter::new(self.options.concurrency);
        let collector = PatternCollector::new(&self.source_root, Arc::clone(&self.exclusions))
            .with_pruned(self.nested_target.clone());
        let collector = &collector;
        let expansions = limiter
            .run(&self.patterns, move |pattern| collector.collect(pattern))
            .await;

        let mut outcomes = Vec::new();
        let mut pooled: Vec<PatternMatch> = Vec::new();
        for expansion in expansions {
            pooled.extend(expansion.matches);
            outcomes.extend(expansion.failures.into_iter().map(|failure| {
                let target = self.target_for(&failure.path);
                LinkOutcome::error(&failure.path, &target, failure.reason)
            }));
        }

        let resolved = resolve_conflicts(pooled);
        tracing::debug!(matches = resolved.len(), "Resolved pattern matches");

        let creator = self.creator();
        let target_root = self.target_root.as_path();
        outcomes.extend(
            limiter
                .run(&resolved, move |found| async move {
                    let kind = if found.is_dir {
                        SourceKind::Directory
                    } else {
                        SourceKind::File
                    };
                    creator
                        .link(&found.path, &target_root.join(&found.relative), kind)
                        .await
                })
                .await,
        );
        outcomes
    }

    fn creator(&self) -> LinkCreator {
        LinkCreator::new(self.options.dry_run, self.options.verbose)
    }

    fn target_for(&self, source: &Path) -> PathBuf {
        source
            .strip_prefix(&self.source_root)
            .map(|rel| self.target_root.join(rel))
            .unwrap_or_else(|_| self.target_root.clone())
    }
}
