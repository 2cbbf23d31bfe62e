//! Shelf engine
//!
//! Orchestrates a [`Repository`] and the [`PatchStore`]:
//!
//! - save: capture, then write, then revert, then verify the working copy
//!   is clean. A failure before the revert leaves the working copy alone; a
//!   failure after the write leaves the patch stored.
//! - apply: read, then apply, then delete the patch only if it applied
//!   cleanly.

use stash_vcs::{ApplyResult, DiffText, Repository};

use crate::store::{PatchStore, validate_name};
use crate::{Error, Result};

/// Outcome of [`Shelf::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The changes were stored and the working copy reverted.
    Saved { name: String, files: Vec<String> },
    /// The working copy had no changes; nothing was touched.
    NothingToShelve,
}

/// Named shelving on top of a patch store.
#[derive(Debug, Clone)]
pub struct Shelf {
    store: PatchStore,
}

impl Shelf {
    pub fn new(store: PatchStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &PatchStore {
        &self.store
    }

    /// Shelve every change in `repo` as `name`.
    pub fn save(&self, repo: &dyn Repository, name: &str, overwrite: bool) -> Result<SaveOutcome> {
        validate_name(name)?;

        let diff = repo.capture_changes()?;
        if diff.is_empty() {
            tracing::info!(root = %repo.root(), "No changes to shelve");
            return Ok(SaveOutcome::NothingToShelve);
        }
        if !overwrite && self.store.exists(name) {
            return Err(Error::NameCollision {
                name: name.to_string(),
            });
        }
        let files = changed_files(&diff)?;

        self.store.write(name, &diff, overwrite)?;
        repo.revert_all()?;

        let remaining = repo.capture_changes()?;
        if !remaining.is_empty() {
            tracing::warn!(name = %name, "Working copy not clean after revert; patch kept");
            return Err(stash_vcs::Error::Revert {
                backend: repo.kind(),
                source: Box::new(stash_vcs::Error::RevertIncomplete {
                    remaining: changed_files(&remaining)?.join("\n"),
                }),
            }
            .into());
        }

        tracing::info!(name = %name, backend = %repo.kind(), files = files.len(), "Shelved changes");
        Ok(SaveOutcome::Saved {
            name: name.to_string(),
            files,
        })
    }

    /// Names of all shelved patches, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Diff text of the patch called `name`.
    pub fn show(&self, name: &str) -> Result<DiffText> {
        self.store.read(name)
    }

    /// Apply the patch called `name` to `repo`.
    ///
    /// The patch is removed from the store only when every hunk applied.
    pub fn apply(&self, repo: &dyn Repository, name: &str) -> Result<ApplyResult> {
        let diff = self.store.read(name)?;
        let result = repo.apply_patch(&diff)?;

        match &result {
            ApplyResult::Clean => {
                self.store.delete(name)?;
                tracing::info!(name = %name, "Applied patch cleanly and removed it");
            }
            ApplyResult::Conflicted(files) => {
                tracing::warn!(name = %name, conflicts = files.len(), "Applied patch with conflicts; patch kept");
            }
        }
        Ok(result)
    }

    /// Delete the patch called `name`.
    pub fn remove(&self, name: &str) -> Result<()> {
        self.store.delete(name)
    }
}

fn changed_files(diff: &DiffText) -> Result<Vec<String>> {
    Ok(diff
        .parse()?
        .paths()
        .into_iter()
        .map(str::to_string)
        .collect())
}
