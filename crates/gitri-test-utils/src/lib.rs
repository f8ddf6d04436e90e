//! Shared test utilities for the gitri workspace.
//!
//! This crate is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fake`]: [`FakeBackend`], an in-memory version-control backend
//! - [`git`]: real git repositories on disk, built with the `git` CLI
//! - [`project`]: [`TestProject`] builder for a project directory

pub mod fake;
pub mod git;
pub mod project;

pub use fake::{FakeBackend, FakeOp};
pub use project::TestProject;
