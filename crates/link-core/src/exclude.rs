//! Exclusion pattern compilation
//!
//! Patterns are compiled once per run into a [`GlobSet`] with literal
//! separators, so `*` stays inside one path segment and `**` crosses them.

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::rules::ExclusionSet;
use crate::{Error, Result};

/// Built-in exclusion patterns, passed explicitly to [`ExclusionCompiler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionDefaults(Vec<String>);

impl ExclusionDefaults {
    /// Dependency caches, version-control metadata and build output.
    pub fn standard() -> Self {
        Self(
            [
                "**/node_modules",
                "**/.git",
                "**/.venv",
                "**/__pycache__",
                "**/dist",
                "**/build",
                "**/target",
                "**/.next",
                "**/.cache",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
        )
    }

    /// No built-in exclusions at all.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn patterns(&self) -> &[String] {
        &self.0
    }
}

impl Default for ExclusionDefaults {
    fn default() -> Self {
        Self::standard()
    }
}

/// Merges the exclusion sources and compiles them into an [`ExclusionMatcher`].
#[derive(Debug, Clone, Default)]
pub struct ExclusionCompiler {
    defaults: ExclusionDefaults,
}

impl ExclusionCompiler {
    pub fn new(defaults: ExclusionDefaults) -> Self {
        Self { defaults }
    }

    /// The pattern list in effect for a run.
    ///
    /// Defaults, then user patterns, then project patterns, with duplicates
    /// removed. When the project replaces defaults only its own list remains.
    pub fn effective_patterns(&self, user: &[String], project: &ExclusionSet) -> Vec<String> {
        let sources: Vec<&[String]> = if project.replace_defaults {
            vec![project.patterns.as_slice()]
        } else {
            vec![self.defaults.patterns(), user, project.patterns.as_slice()]
        };

        let mut merged: Vec<String> = Vec::new();
        for pattern in sources.into_iter().flatten() {
            if !merged.contains(pattern) {
                merged.push(pattern.clone());
            }
        }
        merged
    }

    /// Compile the effective pattern list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for the first pattern that does not parse.
    pub fn compile(&self, user: &[String], project: &ExclusionSet) -> Result<ExclusionMatcher> {
        let patterns = self.effective_patterns(user, project);
        tracing::debug!(count = patterns.len(), replace_defaults = project.replace_defaults, "Compiling exclusions");
        ExclusionMatcher::compile(patterns)
    }
}

/// Compiled exclusion patterns, immutable and shared for the whole run.
#[derive(Debug, Clone)]
pub struct ExclusionMatcher {
    set: GlobSet,
    patterns: Vec<String>,
}

impl ExclusionMatcher {
    /// A matcher that excludes nothing.
    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
            patterns: Vec::new(),
        }
    }

    /// Compile a raw pattern list.
    pub fn compile(patterns: Vec<String>) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            builder.add(build_glob(pattern)?);
        }
        let set = builder.build().map_err(|e| Error::InvalidPattern {
            pattern: patterns.join(", "),
            message: e.to_string(),
        })?;
        Ok(Self { set, patterns })
    }

    /// Whether `relative` (relative to the source root), or any of its
    /// ancestors, matches an exclusion pattern.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        relative
            .ancestors()
            .filter(|p| !p.as_os_str().is_empty())
            .any(|p| self.set.is_match(p))
    }

    /// The source patterns, in effective order
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for ExclusionMatcher {
    fn default() -> Self {
        Self::empty()
    }
}

/// Build a single glob with the matching rules shared by exclusions and link
/// patterns.
pub(crate) fn build_glob(pattern: &str) -> Result<globset::Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.kind().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn standard_matcher() -> ExclusionMatcher {
        ExclusionCompiler::default()
            .compile(&[], &ExclusionSet::default())
            .unwrap()
    }

    #[rstest]
    #[case("node_modules")]
    #[case("web/node_modules")]
    #[case("web/node_modules/react/index.js")]
    #[case(".git/config")]
    #[case("crates/app/target/debug")]
    fn standard_defaults_exclude(#[case] path: &str) {
        assert!(standard_matcher().is_excluded(Path::new(path)));
    }

    #[rstest]
    #[case("conf/a.txt")]
    #[case("node_modules_backup")]
    #[case("src/distance.rs")]
    fn standard_defaults_keep(#[case] path: &str) {
        assert!(!standard_matcher().is_excluded(Path::new(path)));
    }

    #[test]
    fn single_star_stays_inside_segment() {
        let matcher = ExclusionMatcher::compile(vec!["*.log".into()]).unwrap();
        assert!(matcher.is_excluded(Path::new("debug.log")));
        assert!(!matcher.is_excluded(Path::new("logs/debug.log")));
    }

    #[test]
    fn effective_patterns_merge_and_dedupe() {
        let compiler = ExclusionCompiler::new(ExclusionDefaults(vec!["**/dist".into()]));
        let project = ExclusionSet {
            patterns: vec!["**/fixtures".into(), "**/dist".into()],
            replace_defaults: false,
        };
        let merged = compiler.effective_patterns(&["**/tmp".into()], &project);
        assert_eq!(merged, vec!["**/dist", "**/tmp", "**/fixtures"]);
    }

    #[test]
    fn replace_defaults_drops_defaults_and_user() {
        let compiler = ExclusionCompiler::default();
        let project = ExclusionSet {
            patterns: vec!["**/fixtures".into()],
            replace_defaults: true,
        };
        let merged = compiler.effective_patterns(&["**/tmp".into()], &project);
        assert_eq!(merged, vec!["**/fixtures"]);

        let matcher = compiler.compile(&["**/tmp".into()], &project).unwrap();
        assert!(!matcher.is_excluded(Path::new("node_modules")));
        assert!(!matcher.is_excluded(Path::new("tmp")));
        assert!(matcher.is_excluded(Path::new("tests/fixtures/a.json")));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let result = ExclusionMatcher::compile(vec!["src/[".into()]);
        assert!(matches!(result, Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn empty_matcher_excludes_nothing() {
        assert!(!ExclusionMatcher::empty().is_excluded(Path::new("node_modules")));
    }
}
