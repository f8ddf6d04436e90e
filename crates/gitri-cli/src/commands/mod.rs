//! Command implementations for gitri-cli

pub mod init;
pub mod sync;

pub use init::run_init;
pub use sync::{SyncArgs, run_sync};
