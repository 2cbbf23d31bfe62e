//! Error types for stash-core

/// Result type for stash-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in shelf operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A patch with this name is already stored
    #[error("A patch named '{name}' already exists")]
    NameCollision { name: String },

    /// No patch with this name is stored
    #[error("No patch named '{name}'")]
    NotFound { name: String },

    /// The name cannot be used as a patch file name
    #[error("Invalid patch name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// The default store location needs a home directory
    #[error("Could not determine the home directory; use --store or STASH_DIR")]
    NoHomeDirectory,

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from stash-fs
    #[error(transparent)]
    Fs(#[from] stash_fs::Error),

    /// Backend error from stash-vcs
    #[error(transparent)]
    Vcs(#[from] stash_vcs::Error),
}

impl Error {
    /// Whether the error stems from user input or environment rather than a
    /// failing backend or filesystem.
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::NameCollision { .. }
            | Self::NotFound { .. }
            | Self::InvalidName { .. }
            | Self::NoHomeDirectory => true,
            Self::Vcs(e) => e.is_user_error(),
            Self::Fs(stash_fs::Error::ConfigParse { .. }) => true,
            Self::Fs(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn classifies_user_errors() {
        assert!(Error::NotFound { name: "x".into() }.is_user_error());
        assert!(
            Error::Vcs(stash_vcs::Error::NotARepository {
                path: PathBuf::from("/tmp")
            })
            .is_user_error()
        );
        assert!(
            !Error::Fs(stash_fs::Error::LockFailed {
                path: PathBuf::from("/tmp/x")
            })
            .is_user_error()
        );
    }
}
