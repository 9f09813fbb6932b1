//! Glob pattern expansion and overlap resolution
//!
//! Each pattern is walked against the source root on the blocking pool.
//! Exclusions only apply to recursive (`**`) patterns: a pattern such as
//! `.env*` names exactly what it wants and is never filtered.
//!
//! A target root nested inside the source is pruned from every walk, and a
//! directory containing it is never matched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::GlobMatcher;
use walkdir::WalkDir;

use crate::exclude::{ExclusionMatcher, build_glob};
use crate::Result;

/// A link pattern compiled once per run.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    raw: String,
    matcher: GlobMatcher,
    recursive: bool,
    max_depth: usize,
}

impl CompiledPattern {
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`](crate::Error::InvalidPattern) when the
    /// glob does not parse.
    pub fn new(raw: &str) -> Result<Self> {
        let matcher = build_glob(raw)?.compile_matcher();
        let recursive = raw.split('/').any(|segment| segment == "**");
        // Every slash (even inside braces) can add at most one level
        let max_depth = raw.matches('/').count() + 1;
        Ok(Self {
            raw: raw.to_string(),
            matcher,
            recursive,
            max_depth,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern contains a `**` segment.
    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn is_match(&self, relative: &Path) -> bool {
        self.matcher.is_match(relative)
    }
}

/// One source path matched by a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Absolute source path
    pub path: PathBuf,
    /// Path relative to the source root
    pub relative: PathBuf,
    pub is_dir: bool,
}

impl AsRef<Path> for PatternMatch {
    fn as_ref(&self) -> &Path {
        &self.relative
    }
}

/// A walk failure, reported against the path that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything one pattern produced.
#[derive(Debug, Default)]
pub struct PatternExpansion {
    /// Matches in walk order (sorted by file name per directory)
    pub matches: Vec<PatternMatch>,
    pub failures: Vec<WalkFailure>,
}

/// Expands patterns against a fixed source root.
#[derive(Debug, Clone)]
pub struct PatternCollector {
    source_root: PathBuf,
    exclusions: Arc<ExclusionMatcher>,
    pruned: Option<PathBuf>,
}

impl PatternCollector {
    pub fn new(source_root: impl Into<PathBuf>, exclusions: Arc<ExclusionMatcher>) -> Self {
        Self {
            source_root: source_root.into(),
            exclusions,
            pruned: None,
        }
    }

    /// Never descend into `relative` (a path under the source root).
    pub fn with_pruned(mut self, relative: Option<PathBuf>) -> Self {
        self.pruned = relative.filter(|rel| !rel.as_os_str().is_empty());
        self
    }

    /// Walk the source root for `pattern` on the blocking pool.
    pub async fn collect(&self, pattern: &CompiledPattern) -> PatternExpansion {
        let source_root = self.source_root.clone();
        let exclusions = Arc::clone(&self.exclusions);
        let pruned = self.pruned.clone();
        let owned = pattern.clone();

        let walked = tokio::task::spawn_blocking(move || {
            walk(&source_root, &owned, &exclusions, pruned.as_deref())
        });
        match walked.await {
            Ok(expansion) => {
                tracing::debug!(
                    pattern = pattern.as_str(),
                    matches = expansion.matches.len(),
                    failures = expansion.failures.len(),
                    "Expanded pattern"
                );
                expansion
            }
            Err(e) => PatternExpansion {
                matches: Vec::new(),
                failures: vec![WalkFailure {
                    path: self.source_root.clone(),
                    reason: format!("pattern '{}' walk aborted: {e}", pattern.as_str()),
                }],
            },
        }
    }
}

fn walk(
    source_root: &Path,
    pattern: &CompiledPattern,
    exclusions: &ExclusionMatcher,
    pruned: Option<&Path>,
) -> PatternExpansion {
    let mut walker = WalkDir::new(source_root).min_depth(1).sort_by_file_name();
    if !pattern.recursive {
        walker = walker.max_depth(pattern.max_depth);
    }

    let relative_of = |path: &Path| path.strip_prefix(source_root).map(Path::to_path_buf).ok();
    let entries = walker.into_iter().filter_entry(|entry| {
        let Some(rel) = relative_of(entry.path()) else {
            return true;
        };
        if pruned.is_some_and(|pruned| rel.starts_with(pruned)) {
            return false;
        }
        !pattern.recursive || rel.as_os_str().is_empty() || !exclusions.is_excluded(&rel)
    });

    let mut expansion = PatternExpansion::default();
    for entry in entries {
        match entry {
            Ok(entry) => {
                let Some(relative) = relative_of(entry.path()) else {
                    continue;
                };
                if pruned.is_some_and(|pruned| pruned.starts_with(&relative)) {
                    tracing::debug!(path = %relative.display(), "Skipping directory that contains the target");
                    continue;
                }
                if pattern.is_match(&relative) {
                    expansion.matches.push(PatternMatch {
                        path: entry.path().to_path_buf(),
                        relative,
                        is_dir: entry.file_type().is_dir(),
                    });
                }
            }
            Err(e) => expansion.failures.push(WalkFailure {
                path: e.path().unwrap_or(source_root).to_path_buf(),
                reason: format!("failed to walk for pattern '{}': {e}", pattern.as_str()),
            }),
        }
    }
    expansion
}

/// Drop every path that lies beneath another path in the set.
///
/// Duplicates are removed, then candidates are taken shortest first (ties
/// broken lexically); a candidate under an already-kept ancestor is dropped.
/// Ancestry is by whole path components, so `ab` is not under `a`.
pub fn resolve_conflicts<T: AsRef<Path>>(candidates: Vec<T>) -> Vec<T> {
    let mut sorted = candidates;
    sorted.sort_by(|a, b| {
        let (a, b) = (key(a), key(b));
        a.as_os_str()
            .len()
            .cmp(&b.as_os_str().len())
            .then_with(|| a.cmp(b))
    });
    sorted.dedup_by(|a, b| key(a) == key(b));

    let mut kept: Vec<T> = Vec::with_capacity(sorted.len());
    for candidate in sorted {
        let covered = kept
            .iter()
            .any(|ancestor| key(&candidate).starts_with(key(ancestor)));
        if !covered {
            kept.push(candidate);
        }
    }
    kept
}

fn key<T: AsRef<Path>>(item: &T) -> &Path {
    item.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nested_matches_collapse_to_ancestors() {
        let resolved = resolve_conflicts(vec!["a/b/c", "x", "a", "a/b"]);
        assert_eq!(resolved, vec!["a", "x"]);
    }

    #[test]
    fn duplicates_are_removed() {
        let resolved = resolve_conflicts(vec![".env", ".env", "conf/.env"]);
        assert_eq!(resolved, vec![".env", "conf/.env"]);
    }

    #[test]
    fn sibling_prefix_is_not_ancestry() {
        let resolved = resolve_conflicts(vec!["ab", "a", "a/b"]);
        assert_eq!(resolved, vec!["a", "ab"]);
    }

    #[test]
    fn recursive_flag_requires_globstar_segment() {
        assert!(CompiledPattern::new("**/*.log").unwrap().is_recursive());
        assert!(CompiledPattern::new("web/**").unwrap().is_recursive());
        assert!(!CompiledPattern::new("*.log").unwrap().is_recursive());
        assert!(!CompiledPattern::new("logs/*.log").unwrap().is_recursive());
    }

    #[test]
    fn non_recursive_depth_follows_segments() {
        assert_eq!(CompiledPattern::new(".env*").unwrap().max_depth, 1);
        assert_eq!(CompiledPattern::new("config/*.json").unwrap().max_depth, 2);
    }

    #[test]
    fn single_star_does_not_cross_directories() {
        let pattern = CompiledPattern::new("*.log").unwrap();
        assert!(pattern.is_match(Path::new("debug.log")));
        assert!(!pattern.is_match(Path::new("logs/debug.log")));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(matches!(
            CompiledPattern::new("a/{b"),
            Err(crate::Error::InvalidPattern { .. })
        ));
    }
}
