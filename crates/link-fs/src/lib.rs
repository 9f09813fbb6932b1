//! Filesystem primitives for wtlink
//!
//! Provides normalized path handling, single-probe path inspection,
//! format-detecting config loading and atomic writes.

pub mod config;
pub mod constants;
pub mod error;
pub mod inspect;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::LinkPath;
pub use error::{Error, Result};
pub use inspect::{PathInfo, inspect};
pub use path::{NormalizedPath, canonical_root, lexical_normalize};
