//! Run orchestration: tree rules, then pattern rules
//!
//! [`LinkEngine`] is the single entry point that touches the filesystem;
//! [`SyncReport`] summarizes what it returned.

mod engine;
mod report;

pub use engine::{LinkEngine, SyncOptions};
pub use report::SyncReport;
