//! Configuration resolution
//!
//! The `ConfigResolver` loads the user and project files and merges them into
//! the values one run needs. Missing files count as empty.

use std::path::{Path, PathBuf};

use link_fs::{ConfigStore, LinkPath, NormalizedPath};

use super::manifest::{ProjectManifest, UserManifest};
use crate::exclude::{ExclusionCompiler, ExclusionMatcher};
use crate::limiter::DEFAULT_CONCURRENCY;
use crate::rules::{ExclusionSet, RuleSet};
use crate::scripts::ScriptConfig;
use crate::{Error, Result};

/// Platform location of the user config file, if the platform has a config dir.
pub fn default_user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| {
        dir.join(LinkPath::UserConfigDir.as_str())
            .join(LinkPath::UserConfigFile.as_str())
    })
}

/// The effective configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub rules: RuleSet,
    /// Project exclusion input, including the replace flag
    pub project_excludes: ExclusionSet,
    /// User-level exclusion patterns
    pub user_excludes: Vec<String>,
    pub concurrency: usize,
    pub scripts: Vec<ScriptConfig>,
}

impl ResolvedConfig {
    /// Compile the exclusion inputs against `compiler`'s defaults.
    pub fn exclusions(&self, compiler: &ExclusionCompiler) -> Result<ExclusionMatcher> {
        compiler.compile(&self.user_excludes, &self.project_excludes)
    }
}

/// Loads and merges configuration for a source root.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    source_root: NormalizedPath,
    user_config: Option<PathBuf>,
}

impl ConfigResolver {
    /// Resolver using the platform user config location.
    pub fn new(source_root: impl AsRef<Path>) -> Self {
        Self {
            source_root: NormalizedPath::new(source_root.as_ref()),
            user_config: default_user_config_path(),
        }
    }

    /// Override (or disable, with `None`) the user config file.
    pub fn with_user_config(mut self, path: Option<PathBuf>) -> Self {
        self.user_config = path;
        self
    }

    /// Path of `.wtlink.toml` at the source root
    pub fn project_config_path(&self) -> NormalizedPath {
        self.source_root.join(LinkPath::ProjectConfig.as_str())
    }

    pub fn has_project_config(&self) -> bool {
        self.project_config_path().exists()
    }

    /// Load the project manifest, empty when absent.
    pub fn load_project(&self) -> Result<ProjectManifest> {
        let path = self.project_config_path();
        Ok(ConfigStore::new().load_optional(&path)?.unwrap_or_default())
    }

    /// Load the user manifest, empty when absent or disabled.
    pub fn load_user(&self) -> Result<UserManifest> {
        let Some(path) = &self.user_config else {
            return Ok(UserManifest::default());
        };
        let path = NormalizedPath::new(path);
        Ok(ConfigStore::new().load_optional(&path)?.unwrap_or_default())
    }

    /// Load, merge and validate both files.
    ///
    /// # Errors
    ///
    /// - [`Error::Fs`] when a file exists but cannot be read or parsed
    /// - [`Error::InvalidRule`] for escaping or empty rule entries
    /// - [`Error::InvalidConfig`] for a zero concurrency or empty script command
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let user = self.load_user()?;
        let project = self.load_project()?;

        let concurrency = project
            .concurrency
            .or(user.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            return Err(Error::InvalidConfig {
                message: "concurrency must be at least 1".into(),
            });
        }

        if project.exclude.patterns.iter().chain(&user.exclude.patterns).any(|p| p.trim().is_empty()) {
            return Err(Error::InvalidConfig {
                message: "exclusion patterns must not be empty".into(),
            });
        }

        if let Some(script) = project.scripts.iter().find(|s| s.command.trim().is_empty()) {
            return Err(Error::InvalidConfig {
                message: format!("script with arguments {:?} has an empty command", script.args),
            });
        }

        let rules = project.rules()?;
        tracing::debug!(
            source = %self.source_root,
            rules = rules.len(),
            concurrency,
            scripts = project.scripts.len(),
            "Resolved configuration"
        );

        Ok(ResolvedConfig {
            rules,
            project_excludes: project.exclude,
            user_excludes: user.exclude.patterns,
            concurrency,
            scripts: project.scripts,
        })
    }
}
