//! Error types for stash-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Process exit codes.
pub mod exit {
    pub const SUCCESS: i32 = 0;
    /// Save found no changes to shelve.
    pub const NOTHING_TO_DO: i32 = 1;
    pub const USER_ERROR: i32 = 2;
    pub const FAILURE: i32 = 3;
}

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from stash-core
    #[error(transparent)]
    Core(#[from] stash_core::Error),

    /// Error from stash-vcs
    #[error(transparent)]
    Vcs(#[from] stash_vcs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),

    /// Interactive prompt error
    #[error("Interactive prompt error: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        let user_error = match self {
            Self::User { .. } => true,
            Self::Core(err) => err.is_user_error(),
            Self::Vcs(err) => err.is_user_error(),
            Self::Io(_) | Self::Json(_) | Self::Dialoguer(_) => false,
        };
        if user_error {
            exit::USER_ERROR
        } else {
            exit::FAILURE
        }
    }
}
