//! Repository trait shared by all backends

use std::fmt;

use stash_fs::{NormalizedPath, VcsMarker};
use stash_patch::{ApplyResult, UnifiedDiff};

use crate::Result;

/// Supported version-control systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcsKind {
    Mercurial,
    Subversion,
}

impl VcsKind {
    /// Name of the backend's command-line tool.
    pub fn program(&self) -> &'static str {
        match self {
            Self::Mercurial => "hg",
            Self::Subversion => "svn",
        }
    }

    /// Metadata directory marking a working-copy root.
    pub fn marker(&self) -> VcsMarker {
        match self {
            Self::Mercurial => VcsMarker::HgDir,
            Self::Subversion => VcsMarker::SvnDir,
        }
    }

    pub fn from_marker(marker: VcsMarker) -> Self {
        match marker {
            VcsMarker::HgDir => Self::Mercurial,
            VcsMarker::SvnDir => Self::Subversion,
        }
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mercurial => write!(f, "Mercurial"),
            Self::Subversion => write!(f, "Subversion"),
        }
    }
}

/// Git-style unified diff text as produced by a backend and kept in the
/// patch store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffText(String);

impl DiffText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// A diff with nothing but whitespace describes no changes.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn parse(&self) -> Result<UnifiedDiff> {
        Ok(UnifiedDiff::parse(&self.0)?)
    }
}

impl From<String> for DiffText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for DiffText {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl AsRef<str> for DiffText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiffText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capabilities the shelf needs from a working copy.
///
/// One implementation per backend; callers never branch on the backend
/// outside of [`crate::detect`].
pub trait Repository {
    /// Backend driving this working copy.
    fn kind(&self) -> VcsKind;

    /// Working-copy root.
    fn root(&self) -> &NormalizedPath;

    /// Diff of every modification relative to the base revision, including
    /// files scheduled for addition, removed files and tracked files missing
    /// from disk.
    fn capture_changes(&self) -> Result<DiffText>;

    /// Restore every tracked file to the base revision and delete files that
    /// were scheduled for addition.
    fn revert_all(&self) -> Result<()>;

    /// Apply `diff`, falling back to conflict markers for hunks that no
    /// longer match. Created and deleted files are scheduled with the backend.
    fn apply_patch(&self, diff: &DiffText) -> Result<ApplyResult>;
}

/// A detected working copy bound to its backend.
pub type RepositoryHandle = Box<dyn Repository>;
