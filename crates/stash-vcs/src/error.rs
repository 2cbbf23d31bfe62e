//! Error types for stash-vcs

use std::path::PathBuf;

use crate::VcsKind;

/// Result type for stash-vcs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a version-control backend
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not inside a Mercurial or Subversion working copy: {path}")]
    NotARepository { path: PathBuf },

    #[error("Could not run '{program}' (is it installed and on PATH?): {source}")]
    ToolUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program} {args}' failed with exit code {code}:\n{stderr}")]
    CommandFailed {
        program: String,
        args: String,
        code: i32,
        stderr: String,
    },

    #[error("Output of '{program}' is not valid UTF-8")]
    NonUtf8Output { program: String },

    #[error("Failed to capture changes in {backend} working copy: {source}")]
    Capture {
        backend: VcsKind,
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to revert {backend} working copy: {source}")]
    Revert {
        backend: VcsKind,
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to apply patch to {backend} working copy: {source}")]
    Apply {
        backend: VcsKind,
        #[source]
        source: Box<Error>,
    },

    #[error("Working copy still has changes after revert:\n{remaining}")]
    RevertIncomplete { remaining: String },

    #[error(transparent)]
    Patch(#[from] stash_patch::Error),

    #[error(transparent)]
    Fs(#[from] stash_fs::Error),
}

impl Error {
    pub(crate) fn capture(backend: VcsKind, source: Error) -> Self {
        match source {
            Self::ToolUnavailable { .. } | Self::Capture { .. } => source,
            other => Self::Capture {
                backend,
                source: Box::new(other),
            },
        }
    }

    pub(crate) fn revert(backend: VcsKind, source: Error) -> Self {
        match source {
            Self::ToolUnavailable { .. } | Self::Revert { .. } => source,
            other => Self::Revert {
                backend,
                source: Box::new(other),
            },
        }
    }

    pub(crate) fn apply(backend: VcsKind, source: Error) -> Self {
        match source {
            Self::ToolUnavailable { .. } | Self::Apply { .. } => source,
            other => Self::Apply {
                backend,
                source: Box::new(other),
            },
        }
    }

    /// Whether the error is caused by the user's environment rather than a
    /// failing backend (e.g. running outside of a working copy).
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::NotARepository { .. })
    }
}
