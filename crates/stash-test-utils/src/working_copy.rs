//! [`TestWorkingCopy`] builder for end-to-end scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::vcs::{
    hg_available, real_hg_repo_with_commit, real_svn_checkout_with_commit, run, svn_available,
};

/// Backend of a [`TestWorkingCopy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Mercurial,
    Subversion,
}

impl Backend {
    fn program(&self) -> &'static str {
        match self {
            Self::Mercurial => "hg",
            Self::Subversion => "svn",
        }
    }
}

/// A real working copy in a temporary directory with one committed
/// `README.md`.
///
/// # Example
///
/// ```rust,no_run
/// use stash_test_utils::TestWorkingCopy;
///
/// let Some(wc) = TestWorkingCopy::mercurial() else { return };
/// wc.write("a.txt", "foo\n");
/// wc.add("a.txt");
/// wc.commit("add a.txt");
/// assert!(wc.is_clean());
/// ```
pub struct TestWorkingCopy {
    _temp_dir: TempDir,
    root: PathBuf,
    backend: Backend,
}

impl TestWorkingCopy {
    /// Create a Mercurial working copy, or `None` (with a note on stderr)
    /// when `hg` is not installed.
    pub fn mercurial() -> Option<Self> {
        if !hg_available() {
            eprintln!("skipping: hg is not installed");
            return None;
        }
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        real_hg_repo_with_commit(&root);
        Some(Self {
            _temp_dir: temp_dir,
            root,
            backend: Backend::Mercurial,
        })
    }

    /// Create a Subversion checkout backed by a local `file://` repository,
    /// or `None` (with a note on stderr) when `svn` is not installed.
    pub fn subversion() -> Option<Self> {
        if !svn_available() {
            eprintln!("skipping: svn is not installed");
            return None;
        }
        let temp_dir = TempDir::new().unwrap();
        let server = temp_dir.path().join("server");
        let root = temp_dir.path().join("wc");
        fs::create_dir(&server).unwrap();
        real_svn_checkout_with_commit(&server, &root);
        Some(Self {
            _temp_dir: temp_dir,
            root,
            backend: Backend::Subversion,
        })
    }

    /// Create a working copy for `backend` if its tool is installed.
    pub fn for_backend(backend: Backend) -> Option<Self> {
        match backend {
            Backend::Mercurial => Self::mercurial(),
            Backend::Subversion => Self::subversion(),
        }
    }

    /// Root path of the working copy.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `content` to `path` (relative to the root), creating parents.
    pub fn write(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", full_path.display()));
    }

    /// Read the file at `path` (relative to the root).
    pub fn read(&self, path: &str) -> String {
        let full_path = self.root.join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("Could not read {}: {e}", full_path.display()))
    }

    /// Delete `path` from disk without telling the backend.
    pub fn delete(&self, path: &str) {
        fs::remove_file(self.root.join(path)).unwrap();
    }

    /// Schedule `path` for addition.
    pub fn add(&self, path: &str) {
        match self.backend {
            Backend::Mercurial => self.vcs(&["add", path]),
            Backend::Subversion => self.vcs(&["add", "-q", "--parents", path]),
        };
    }

    /// Schedule `path` for removal (deleting it from disk).
    pub fn remove(&self, path: &str) {
        match self.backend {
            Backend::Mercurial => self.vcs(&["remove", path]),
            Backend::Subversion => self.vcs(&["delete", "-q", path]),
        };
    }

    /// Commit every pending change.
    pub fn commit(&self, message: &str) {
        match self.backend {
            Backend::Mercurial => self.vcs(&["commit", "-m", message]),
            Backend::Subversion => {
                self.vcs(&["commit", "-q", "-m", message, "--username", "test"])
            }
        };
    }

    /// Status output, one line per changed file.
    pub fn status(&self) -> String {
        self.vcs(&["status"])
    }

    /// Whether no tracked file differs from the base revision and nothing is
    /// scheduled. Unknown (`?`) files are ignored.
    pub fn is_clean(&self) -> bool {
        self.status()
            .lines()
            .all(|line| line.trim().is_empty() || line.starts_with('?'))
    }

    /// Run the backend tool in the working copy and return stdout.
    pub fn vcs(&self, args: &[&str]) -> String {
        run(self.backend.program(), &self.root, args)
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root.join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root.join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path,
            content,
            file_content
        );
    }
}
