//! Symlink synchronization engine for wtlink
//!
//! This crate mirrors selected paths of a source working directory into a
//! target working directory as symbolic links:
//!
//! - **Rules**: tree rules mirror a directory leaf by leaf, pattern rules
//!   expand globs against the source root
//! - **Exclusions**: default, user and project glob lists compiled once per run
//! - **Link decisions**: every candidate path ends as created, skipped or error,
//!   and real entries in the target are never touched
//! - **Configuration**: `.wtlink.toml` plus the user-level config file
//! - **Scripts**: post-link commands run in the target directory
//!
//! # Architecture
//!
//! ```text
//!            link-cli
//!               |
//!           link-core
//!           /       \
//!      link-fs    link-git
//! ```
//!
//! # Example
//!
//! ```ignore
//! use link_core::{ExclusionCompiler, ExclusionDefaults, LinkEngine, RuleSet, SyncOptions};
//!
//! async fn example(source: &Path, target: &Path) -> link_core::Result<()> {
//!     let rules = RuleSet::from_lists(&["conf"], &["**/*.local.json"])?;
//!     let matcher = ExclusionCompiler::new(ExclusionDefaults::standard())
//!         .compile(&[], &Default::default())?;
//!     let engine = LinkEngine::new(source, target, &rules, matcher, SyncOptions::default())?;
//!     let outcomes = engine.run().await;
//!     Ok(())
//! }
//! ```

/// Log a skip/recursion decision at DEBUG, or INFO when the run is verbose.
macro_rules! diagnostic {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

pub mod config;
pub mod error;
pub mod exclude;
pub mod limiter;
pub mod link;
pub mod pattern;
pub mod rules;
pub mod scripts;
pub mod sync;
pub mod tree;

pub use config::{ConfigResolver, ProjectManifest, ResolvedConfig, UserManifest};
pub use error::{Error, Result};
pub use exclude::{ExclusionCompiler, ExclusionDefaults, ExclusionMatcher};
pub use limiter::{ConcurrencyLimiter, DEFAULT_CONCURRENCY};
pub use link::{LinkAction, LinkCreator, LinkOutcome, SourceKind};
pub use pattern::{CompiledPattern, PatternCollector, PatternExpansion, PatternMatch, resolve_conflicts};
pub use rules::{ExclusionSet, LinkRule, RuleSet};
pub use scripts::{ScriptConfig, ScriptContext, ScriptResult, run_scripts};
pub use sync::{LinkEngine, SyncOptions, SyncReport};
pub use tree::TreeSynchronizer;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn error_invalid_root_displays_path() {
        let error = Error::InvalidRoot {
            path: PathBuf::from("/work/feature"),
            reason: "not absolute".into(),
        };

        let display = error.to_string();
        assert!(display.contains("/work/feature"), "got: {display}");
        assert!(display.contains("not absolute"), "got: {display}");
    }
}
