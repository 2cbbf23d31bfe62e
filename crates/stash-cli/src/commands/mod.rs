//! Command implementations for stash-cli

pub mod apply;
pub mod patches;
pub mod save;

pub use apply::run_apply;
pub use patches::{run_list, run_remove, run_show};
pub use save::run_save;
