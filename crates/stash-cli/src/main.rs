//! stash CLI
//!
//! Shelves Mercurial and Subversion working-copy changes as named patches.

mod cli;
mod commands;
mod error;
mod interactive;

use clap::Parser;
use colored::Colorize;
use stash_core::{PatchStore, Shelf, StashConfig};
use tracing_subscriber::EnvFilter;

use cli::{Action, Cli};
use error::Result;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(e.exit_code());
        }
    }
}

/// `-v` forces debug output; otherwise `RUST_LOG` applies, defaulting to warnings.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

fn run(cli: &Cli) -> Result<i32> {
    let action = cli.action()?;
    let config = StashConfig::resolve(cli.store.as_deref())?;
    tracing::debug!(store = %config.store_dir, "Resolved patch store");
    let shelf = Shelf::new(PatchStore::new(config.store_dir));

    match action {
        Action::Save { name, force } => {
            let cwd = std::env::current_dir()?;
            let prompt = interactive::collision_prompt();
            commands::run_save(&shelf, &cwd, &name, force, prompt.as_ref())
        }
        Action::List { json } => commands::run_list(&shelf, json),
        Action::Show { name } => commands::run_show(&shelf, &name),
        Action::Apply { name } => {
            let cwd = std::env::current_dir()?;
            commands::run_apply(&shelf, &cwd, &name)
        }
        Action::Remove { name } => commands::run_remove(&shelf, &name),
    }
}
