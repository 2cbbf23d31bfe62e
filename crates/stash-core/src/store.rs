//! On-disk patch store
//!
//! A flat directory holding one file per patch, named after the patch and
//! containing the raw diff text. Writes go through a temporary dot file and
//! a rename, so listings never see a half-written patch.

use std::fs;

use stash_fs::{NormalizedPath, io, validate_file_name};
use stash_vcs::DiffText;

use crate::{Error, Result};

/// Check that `name` can be used as a patch file name.
pub fn validate_name(name: &str) -> Result<()> {
    validate_file_name(name, "patch name").map_err(|reason| Error::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// Named patches kept in a single directory.
#[derive(Debug, Clone)]
pub struct PatchStore {
    root: NormalizedPath,
}

impl PatchStore {
    /// Store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<NormalizedPath> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }

    /// Whether a patch called `name` is stored. Invalid names never exist.
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_ok_and(|path| path.is_file())
    }

    /// Store `content` as `name`.
    ///
    /// Fails with [`Error::NameCollision`] if the name is taken and
    /// `overwrite` is false.
    pub fn write(&self, name: &str, content: &DiffText, overwrite: bool) -> Result<()> {
        let path = self.path_for(name)?;
        if !overwrite && path.is_file() {
            return Err(Error::NameCollision {
                name: name.to_string(),
            });
        }
        io::write_text(&path, content.as_str())?;
        tracing::debug!(name = %name, path = %path, overwrite, "Stored patch");
        Ok(())
    }

    /// Read the patch called `name`.
    pub fn read(&self, name: &str) -> Result<DiffText> {
        let path = self.path_for(name)?;
        match io::read_text(&path) {
            Ok(text) => Ok(DiffText::from(text)),
            Err(e) if e.is_not_found() => Err(Error::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of all stored patches, sorted.
    ///
    /// Dot files (in-flight writes) and directories are skipped; a store
    /// directory that does not exist yet lists as empty.
    pub fn list(&self) -> Result<Vec<String>> {
        let dir = self.root.to_native();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.root, "Store directory does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(stash_fs::Error::io(&dir, e).into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| stash_fs::Error::io(&dir, e))?;
            let is_file = entry
                .file_type()
                .map_err(|e| stash_fs::Error::io(entry.path(), e))?
                .is_file();
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::debug!(path = %entry.path().display(), "Skipping non UTF-8 file name");
                continue;
            };
            if is_file && !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete the patch called `name`.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        match io::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(name = %name, "Deleted patch");
                Ok(())
            }
            Err(e) if e.is_not_found() => Err(Error::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
