//! Filesystem abstraction for stash
//!
//! Provides normalized path handling, atomic writes and configuration loading
//! shared by the patch store and the version-control backends.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::VcsMarker;
pub use error::{Error, Result};
pub use path::{NormalizedPath, validate_file_name};
