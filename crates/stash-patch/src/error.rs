//! Error types for stash-patch

/// Result type for stash-patch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or applying a diff
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed diff at line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("Binary changes to '{path}' cannot be stored as a text patch")]
    Binary { path: String },

    #[error("Property changes on '{path}' cannot be stored as a text patch; commit or revert them first")]
    Properties { path: String },

    #[error("Refusing to touch '{path}': path escapes the working copy root")]
    PathOutsideRoot { path: String },

    #[error(transparent)]
    Fs(#[from] stash_fs::Error),
}

impl Error {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }
}
