//! Configuration loading and resolution
//!
//! Two files feed a run:
//!
//! - `.wtlink.toml` at the source root ([`ProjectManifest`]): rules, project
//!   exclusions, concurrency and post-link scripts
//! - `<config dir>/wtlink/config.toml` ([`UserManifest`]): personal
//!   exclusions and a default concurrency
//!
//! [`ConfigResolver`] loads both and produces a validated [`ResolvedConfig`].

mod manifest;
mod resolver;

pub use manifest::{ProjectManifest, UserExcludes, UserManifest};
pub use resolver::{ConfigResolver, ResolvedConfig, default_user_config_path};
