//! Link rules and exclusion inputs
//!
//! Rules are loaded once per run and never change while it executes.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One declarative instruction describing what to mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkRule {
    /// Mirror a directory (or a single file) recursively, relative to the
    /// source root. An empty path mirrors the whole source root.
    Tree { path: PathBuf },
    /// Link every source path matched by a glob
    Pattern { pattern: String },
}

impl LinkRule {
    /// Build a validated tree rule.
    ///
    /// `./` segments are dropped; absolute paths and `..` are rejected.
    pub fn tree(path: impl AsRef<Path>) -> Result<Self> {
        let raw = path.as_ref();
        let invalid = |reason: &str| Error::InvalidRule {
            rule: raw.display().to_string(),
            reason: reason.to_string(),
        };

        if raw.as_os_str().is_empty() {
            return Err(invalid("tree path is empty"));
        }

        let mut normalized = PathBuf::new();
        for component in raw.components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir => return Err(invalid("path must not contain '..'")),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid("path must be relative to the source root"));
                }
            }
        }

        Ok(Self::Tree { path: normalized })
    }

    /// Build a validated pattern rule.
    pub fn pattern(pattern: impl Into<String>) -> Result<Self> {
        let raw: String = pattern.into();
        let invalid = |reason: &str| Error::InvalidRule {
            rule: raw.clone(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if trimmed.starts_with('/') || Path::new(trimmed).is_absolute() {
            return Err(invalid("pattern must be relative to the source root"));
        }
        if trimmed.split('/').any(|segment| segment == "..") {
            return Err(invalid("pattern must not contain '..'"));
        }

        let cleaned = trimmed.trim_start_matches("./").to_string();
        Ok(Self::Pattern { pattern: cleaned })
    }
}

impl fmt::Display for LinkRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree { path } => write!(f, "tree:{}", path.display()),
            Self::Pattern { pattern } => write!(f, "pattern:{pattern}"),
        }
    }
}

/// The ordered rules for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<LinkRule>,
}

impl RuleSet {
    /// Wrap already-validated rules.
    pub fn new(rules: Vec<LinkRule>) -> Self {
        Self { rules }
    }

    /// Validate raw tree paths and glob patterns from configuration.
    pub fn from_lists<T, P>(tree: &[T], patterns: &[P]) -> Result<Self>
    where
        T: AsRef<Path>,
        P: AsRef<str>,
    {
        let mut rules = Vec::with_capacity(tree.len() + patterns.len());
        for path in tree {
            rules.push(LinkRule::tree(path)?);
        }
        for pattern in patterns {
            rules.push(LinkRule::pattern(pattern.as_ref())?);
        }
        Ok(Self { rules })
    }

    /// All rules in declaration order
    pub fn rules(&self) -> &[LinkRule] {
        &self.rules
    }

    /// Relative roots of every tree rule.
    pub fn tree_paths(&self) -> impl Iterator<Item = &Path> {
        self.rules.iter().filter_map(|rule| match rule {
            LinkRule::Tree { path } => Some(path.as_path()),
            LinkRule::Pattern { .. } => None,
        })
    }

    /// Glob strings of every pattern rule.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().filter_map(|rule| match rule {
            LinkRule::Pattern { pattern } => Some(pattern.as_str()),
            LinkRule::Tree { .. } => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

/// Project-level exclusion input.
///
/// With `replace_defaults` set, these patterns are the only exclusions in
/// effect: both the built-in defaults and the user-level list are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSet {
    #[serde(default)]
    pub patterns: Vec<String>,

    #[serde(default)]
    pub replace_defaults: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn tree_rule_drops_current_dir_segments() {
        let rule = LinkRule::tree("./conf/./local").unwrap();
        assert_eq!(
            rule,
            LinkRule::Tree {
                path: PathBuf::from("conf/local")
            }
        );
    }

    #[test]
    fn tree_rule_dot_mirrors_whole_root() {
        let rule = LinkRule::tree(".").unwrap();
        assert_eq!(
            rule,
            LinkRule::Tree {
                path: PathBuf::new()
            }
        );
    }

    #[rstest]
    #[case("")]
    #[case("../outside")]
    #[case("conf/../../etc")]
    #[case("/etc/hosts")]
    fn tree_rule_rejects_escaping_paths(#[case] path: &str) {
        assert!(matches!(
            LinkRule::tree(path),
            Err(Error::InvalidRule { .. })
        ));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("/abs/*.txt")]
    #[case("../*.env")]
    #[case("src/../../*.env")]
    fn pattern_rule_rejects_invalid(#[case] pattern: &str) {
        assert!(matches!(
            LinkRule::pattern(pattern),
            Err(Error::InvalidRule { .. })
        ));
    }

    #[test]
    fn pattern_rule_strips_leading_current_dir() {
        let rule = LinkRule::pattern("./.env*").unwrap();
        assert_eq!(
            rule,
            LinkRule::Pattern {
                pattern: ".env*".into()
            }
        );
    }

    #[test]
    fn rule_set_splits_by_kind() {
        let rules = RuleSet::from_lists(&["conf", ".vscode"], &["**/*.log"]).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(
            rules.tree_paths().collect::<Vec<_>>(),
            vec![Path::new("conf"), Path::new(".vscode")]
        );
        assert_eq!(rules.patterns().collect::<Vec<_>>(), vec!["**/*.log"]);
    }

    #[test]
    fn rule_display() {
        assert_eq!(LinkRule::tree("conf").unwrap().to_string(), "tree:conf");
        assert_eq!(
            LinkRule::pattern("*.env").unwrap().to_string(),
            "pattern:*.env"
        );
    }

    #[test]
    fn exclusion_set_defaults_from_empty_toml() {
        let set: ExclusionSet = toml::from_str("").unwrap();
        assert!(set.patterns.is_empty());
        assert!(!set.replace_defaults);
    }
}
