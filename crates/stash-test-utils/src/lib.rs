//! Shared test utilities for the stash workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`vcs`] - Mercurial and Subversion fixtures at two realism levels
//! - [`working_copy`] - [`TestWorkingCopy`] builder for end-to-end scenarios

pub mod vcs;
pub mod working_copy;

pub use working_copy::{Backend, TestWorkingCopy};
