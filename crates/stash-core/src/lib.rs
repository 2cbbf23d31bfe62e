//! Core orchestration layer for stash
//!
//! - [`PatchStore`] keeps named patches in a flat directory.
//! - [`Shelf`] saves, lists, shows, applies and removes patches against a
//!   working copy bound through [`stash_vcs::detect`].
//! - [`StashConfig`] resolves where the store lives.

pub mod config;
pub mod engine;
pub mod error;
pub mod store;

pub use config::StashConfig;
pub use engine::{SaveOutcome, Shelf};
pub use error::{Error, Result};
pub use store::{PatchStore, validate_name};
