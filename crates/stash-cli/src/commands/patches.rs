//! Commands that only touch the patch store

use colored::Colorize;
use serde_json::json;
use stash_core::Shelf;

use crate::error::{Result, exit};

/// Print saved patch names, one per line, or as JSON.
pub fn run_list(shelf: &Shelf, as_json: bool) -> Result<i32> {
    let names = shelf.list()?;

    if as_json {
        let output = json!({
            "store": shelf.store().root().as_str(),
            "patches": names,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(exit::SUCCESS);
    }

    if names.is_empty() {
        eprintln!(
            "{} No patches in {}",
            "note:".yellow().bold(),
            shelf.store().root()
        );
    }
    for name in names {
        println!("{name}");
    }
    Ok(exit::SUCCESS)
}

/// Print the diff text of `name` unchanged.
pub fn run_show(shelf: &Shelf, name: &str) -> Result<i32> {
    let diff = shelf.show(name)?;
    print!("{diff}");
    Ok(exit::SUCCESS)
}

pub fn run_remove(shelf: &Shelf, name: &str) -> Result<i32> {
    shelf.remove(name)?;
    println!("{} {}", "Removed".green().bold(), name.cyan());
    Ok(exit::SUCCESS)
}
