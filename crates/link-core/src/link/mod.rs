//! Per-path link decisions
//!
//! [`LinkCreator`] turns one (source, target) pair into exactly one
//! [`LinkOutcome`]. It keeps no state between paths.

mod creator;
mod outcome;

pub use creator::{LinkCreator, SourceKind};
pub use outcome::{LinkAction, LinkOutcome, reason};
