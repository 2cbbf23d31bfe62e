//! Apply command

use std::path::Path;

use colored::Colorize;
use stash_core::Shelf;
use stash_vcs::ApplyResult;

use crate::error::{Result, exit};

/// Apply the patch `name` to the working copy containing `cwd`.
///
/// Conflicts are reported but still count as success.
pub fn run_apply(shelf: &Shelf, cwd: &Path, name: &str) -> Result<i32> {
    let repo = stash_vcs::detect(cwd)?;

    match shelf.apply(repo.as_ref(), name)? {
        ApplyResult::Clean => {
            println!("{} {}", "Applied".green().bold(), name.cyan());
        }
        ApplyResult::Conflicted(files) => {
            println!(
                "{} {} with conflicts in {} file(s); the patch was kept",
                "Applied".yellow().bold(),
                name.cyan(),
                files.len()
            );
            for file in files {
                println!("  {} {}", "C".red().bold(), file);
            }
            println!("Resolve the conflict markers, then remove the patch with 'stash -r {name}'.");
        }
    }
    Ok(exit::SUCCESS)
}
