//! Unified diff parsing and conflict-aware patch application
//!
//! This crate is the library replacement for `patch -p1 --merge`:
//!
//! - [`UnifiedDiff::parse`] reads git-style unified diffs as produced by
//!   `hg diff --git` and `svn diff --git`.
//! - [`apply::apply_to_dir`] applies a parsed diff to a working directory.
//!   Hunks that can be located exactly are applied; hunks that cannot are
//!   replaced by conflict markers and the file is reported as conflicted.
//! - [`render::render_deletion`] produces a deletion diff for a file whose
//!   base content is known, used to capture files missing from disk.

pub mod apply;
pub mod diff;
pub mod error;
pub mod render;

pub use apply::{ApplyReport, ApplyResult, MergedText, apply_to_dir, merge_hunks};
pub use diff::{FilePatch, Hunk, HunkLine, UnifiedDiff};
pub use error::{Error, Result};

/// Marker opening the local side of a conflict region.
pub const CONFLICT_LOCAL: &str = "<<<<<<< local";
/// Marker separating the local and incoming sides.
pub const CONFLICT_SEPARATOR: &str = "=======";
/// Marker closing the incoming side of a conflict region.
pub const CONFLICT_INCOMING: &str = ">>>>>>> incoming";
