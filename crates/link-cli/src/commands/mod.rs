//! Command implementations for link-cli

pub mod init;
pub mod list;
pub mod sync;

pub use init::run_init;
pub use list::run_list;
pub use sync::{SyncArgs, run_sync};
