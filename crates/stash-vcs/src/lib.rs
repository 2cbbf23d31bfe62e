//! Version-control backends for stash
//!
//! Each backend implements [`Repository`]: capture every working-copy change
//! as a git-style diff, revert the working copy to its base revision, and
//! apply a diff with conflict-marker fallback.

mod cleanup;
mod command;
pub mod detect;
pub mod error;
pub mod mercurial;
pub mod provider;
pub mod subversion;

pub use detect::{detect, locate, open};
pub use error::{Error, Result};
pub use mercurial::MercurialRepository;
pub use provider::{DiffText, Repository, RepositoryHandle, VcsKind};
pub use stash_patch::ApplyResult;
pub use subversion::SubversionRepository;
