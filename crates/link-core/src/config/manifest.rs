//! Manifest structures for the project and user config files

use serde::{Deserialize, Serialize};

use crate::rules::{ExclusionSet, RuleSet};
use crate::scripts::ScriptConfig;
use crate::Result;

/// Project configuration parsed from `.wtlink.toml`.
///
/// ```toml
/// tree = ["conf", ".vscode"]
/// patterns = [".env*", "**/*.local.json"]
/// concurrency = 100
///
/// [exclude]
/// patterns = ["**/fixtures"]
/// replace_defaults = false
///
/// [[scripts]]
/// command = "npm"
/// args = ["install"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectManifest {
    /// Directories (or files) mirrored recursively
    #[serde(default)]
    pub tree: Vec<String>,

    /// Glob patterns evaluated against the source root
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Maximum in-flight filesystem tasks, overriding the user setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    #[serde(default)]
    pub exclude: ExclusionSet,

    /// Commands run in the target after linking
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<ScriptConfig>,
}

impl ProjectManifest {
    /// A starting point written by `wtlink init`.
    pub fn starter() -> Self {
        Self {
            tree: Vec::new(),
            patterns: vec![".env".into(), ".env.*".into()],
            concurrency: None,
            exclude: ExclusionSet::default(),
            scripts: Vec::new(),
        }
    }

    /// Validate the rule lists into a [`RuleSet`].
    pub fn rules(&self) -> Result<RuleSet> {
        RuleSet::from_lists(&self.tree, &self.patterns)
    }
}

/// User-level exclusion list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserExcludes {
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// User configuration parsed from `<config dir>/wtlink/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserManifest {
    #[serde(default)]
    pub exclude: UserExcludes,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_full_project_manifest() {
        let manifest: ProjectManifest = toml::from_str(
            r#"
tree = ["conf"]
patterns = [".env*"]
concurrency = 8

[exclude]
patterns = ["**/fixtures"]
replace_defaults = true

[[scripts]]
command = "npm"
args = ["install"]
required = false
"#,
        )
        .unwrap();

        assert_eq!(manifest.tree, vec!["conf"]);
        assert_eq!(manifest.patterns, vec![".env*"]);
        assert_eq!(manifest.concurrency, Some(8));
        assert!(manifest.exclude.replace_defaults);
        assert_eq!(manifest.scripts.len(), 1);
        assert!(!manifest.scripts[0].required);
    }

    #[test]
    fn empty_manifest_has_no_rules() {
        let manifest: ProjectManifest = toml::from_str("").unwrap();
        assert!(manifest.rules().unwrap().is_empty());
        assert!(manifest.scripts.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = toml::from_str::<ProjectManifest>("trees = [\"conf\"]");
        assert!(result.is_err());
    }

    #[test]
    fn starter_round_trips_through_toml() {
        let starter = ProjectManifest::starter();
        let text = toml::to_string_pretty(&starter).unwrap();
        assert_eq!(toml::from_str::<ProjectManifest>(&text).unwrap(), starter);
    }
}
