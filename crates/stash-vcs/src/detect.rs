//! Working-copy detection
//!
//! Walks up from a starting directory looking for backend metadata
//! directories. The nearest enclosing working copy wins; within a single
//! directory `.hg` is tested before `.svn`.

use std::path::Path;

use stash_fs::{NormalizedPath, VcsMarker};

use crate::mercurial::MercurialRepository;
use crate::provider::{RepositoryHandle, VcsKind};
use crate::subversion::SubversionRepository;
use crate::{Error, Result};

/// Find the working copy governing `start` and bind its backend.
pub fn detect(start: impl AsRef<Path>) -> Result<RepositoryHandle> {
    let (kind, root) = locate(start)?;
    Ok(open(kind, root))
}

/// Find the working-copy root governing `start` without binding a backend.
pub fn locate(start: impl AsRef<Path>) -> Result<(VcsKind, NormalizedPath)> {
    let start = start.as_ref();
    let canonical = dunce::canonicalize(start).map_err(|e| stash_fs::Error::io(start, e))?;

    for dir in canonical.ancestors() {
        for marker in VcsMarker::ALL {
            if dir.join(marker).is_dir() {
                let kind = VcsKind::from_marker(marker);
                tracing::debug!(root = %dir.display(), backend = %kind, "Found working copy");
                return Ok((kind, NormalizedPath::new(dir)));
            }
        }
    }

    Err(Error::NotARepository { path: canonical })
}

/// Bind the backend for a known working-copy root.
pub fn open(kind: VcsKind, root: NormalizedPath) -> RepositoryHandle {
    match kind {
        VcsKind::Mercurial => Box::new(MercurialRepository::new(root)),
        VcsKind::Subversion => Box::new(SubversionRepository::new(root)),
    }
}
