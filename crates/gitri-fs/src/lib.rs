//! Filesystem layer for gitri projects
//!
//! Provides the on-disk project layout, path confinement, atomic I/O,
//! the project lock, and configuration loading.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod lock;
pub mod path;

pub use config::ConfigStore;
pub use constants::ProjectPath;
pub use error::{Error, Result};
pub use lock::ProjectLock;
pub use path::{NormalizedPath, confine_relative};
