//! Removing files left behind by reverted additions

use stash_fs::{NormalizedPath, io};

use crate::Result;

/// Delete files that were scheduled for addition before a revert.
///
/// `paths` are relative to `root`. Directories in `paths` are removed once
/// empty, deepest first. With `prune_parents`, directories that became empty
/// because of the deletions are removed too (for backends that do not track
/// directories). `root` itself is never removed.
pub(crate) fn remove_added(
    root: &NormalizedPath,
    paths: &[String],
    prune_parents: bool,
) -> Result<()> {
    let mut dirs: Vec<&str> = Vec::new();

    for relative in paths {
        let target = root.join(relative);
        if target.is_file() {
            io::remove_file(&target)?;
            tracing::debug!(path = %relative, "Removed file scheduled for addition");
        } else if target.is_dir() {
            dirs.push(relative);
        }

        if prune_parents {
            let mut end = relative.len();
            while let Some(idx) = relative[..end].rfind('/') {
                dirs.push(&relative[..idx]);
                end = idx;
            }
        }
    }

    dirs.sort_by(|a, b| {
        b.matches('/')
            .count()
            .cmp(&a.matches('/').count())
            .then_with(|| a.cmp(b))
    });
    dirs.dedup();
    for dir in dirs {
        if io::remove_empty_dir(&root.join(dir))? {
            tracing::debug!(path = %dir, "Removed empty directory");
        }
    }
    Ok(())
}
