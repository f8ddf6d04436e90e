//! Version-control backend for gitri
//!
//! The sync engine talks to repositories only through [`VcsBackend`] and
//! [`RepoHandle`]. [`Git2Backend`] is the production implementation.

pub mod backend;
pub mod error;
pub mod git2_backend;
pub mod helpers;
pub mod naming;

pub use backend::{CloneRequest, RepoHandle, VcsBackend};
pub use error::{Error, Result};
pub use git2_backend::{Git2Backend, Git2Repo};
pub use naming::SyncRefs;
