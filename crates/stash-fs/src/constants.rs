//! Constants and enums for well-known filesystem names.

use std::path::Path;

/// Default name of the patch store directory inside the user's home.
pub const DEFAULT_STORE_DIR: &str = ".stash";

/// Directory name used under the platform config directory.
pub const CONFIG_DIR: &str = "stash";

/// Name of the user configuration file.
pub const CONFIG_FILE: &str = "config.toml";

/// Version-control metadata directories that mark a working-copy root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsMarker {
    /// The `.hg` directory (Mercurial)
    HgDir,
    /// The `.svn` directory (Subversion)
    SvnDir,
}

impl VcsMarker {
    /// Markers in the order they are tested within a single directory.
    pub const ALL: [VcsMarker; 2] = [VcsMarker::HgDir, VcsMarker::SvnDir];

    /// Get the string representation of the marker.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HgDir => ".hg",
            Self::SvnDir => ".svn",
        }
    }
}

impl AsRef<Path> for VcsMarker {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for VcsMarker {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for VcsMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
