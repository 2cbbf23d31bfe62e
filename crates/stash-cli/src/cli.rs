//! CLI argument definitions using clap derive

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::error::{CliError, Result};

/// Shelve Mercurial and Subversion working-copy changes as named patches
///
/// `stash NAME` saves every change in the current working copy as NAME and
/// reverts the working copy. Use the flags below to inspect or restore
/// saved patches.
#[derive(Parser, Debug)]
#[command(name = "stash")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("action").args(["list", "show", "apply", "remove"])))]
pub struct Cli {
    /// Patch name
    pub name: Option<String>,

    /// List saved patches
    #[arg(short, long, conflicts_with = "name")]
    pub list: bool,

    /// Print a saved patch
    #[arg(short, long)]
    pub show: bool,

    /// Apply a saved patch to the working copy; it is removed if it applies cleanly
    #[arg(short, long)]
    pub apply: bool,

    /// Delete a saved patch
    #[arg(short, long)]
    pub remove: bool,

    /// Overwrite an existing patch without asking
    #[arg(short, long, conflicts_with_all = ["list", "show", "apply", "remove"])]
    pub force: bool,

    /// Print the patch list as JSON (with --list)
    #[arg(long)]
    pub json: bool,

    /// Directory holding saved patches
    #[arg(long, env = "STASH_DIR", value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// What one invocation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Save { name: String, force: bool },
    List { json: bool },
    Show { name: String },
    Apply { name: String },
    Remove { name: String },
}

impl Cli {
    pub fn action(&self) -> Result<Action> {
        if self.list {
            return Ok(Action::List { json: self.json });
        }
        if self.json {
            return Err(CliError::user("--json can only be used with --list"));
        }
        let Some(name) = self.name.clone() else {
            return Err(CliError::user(
                "a patch name is required (run 'stash --help' for usage)",
            ));
        };
        Ok(if self.show {
            Action::Show { name }
        } else if self.apply {
            Action::Apply { name }
        } else if self.remove {
            Action::Remove { name }
        } else {
            Action::Save {
                name,
                force: self.force,
            }
        })
    }
}
