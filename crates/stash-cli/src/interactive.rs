//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for the name-collision confirmation on save.

use std::io::IsTerminal;

use dialoguer::{Confirm, Input};
use stash_core::validate_name;

use crate::error::{CliError, Result};

/// How to continue after a save hit an existing patch name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Overwrite,
    Rename(String),
}

/// Decides what to do when a patch name is already taken.
pub trait CollisionPrompt {
    fn resolve(&self, name: &str) -> Result<Resolution>;
}

/// Asks on the terminal.
pub struct TerminalPrompt;

impl CollisionPrompt for TerminalPrompt {
    fn resolve(&self, name: &str) -> Result<Resolution> {
        let overwrite = Confirm::new()
            .with_prompt(format!("A patch named '{name}' already exists. Overwrite?"))
            .default(true)
            .interact()?;
        if overwrite {
            return Ok(Resolution::Overwrite);
        }

        let new_name: String = Input::new()
            .with_prompt("New patch name")
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                validate_name(input).map_err(|e| e.to_string())
            })
            .interact_text()?;
        Ok(Resolution::Rename(new_name))
    }
}

/// Fails with a user error; used when stdin or stderr is not a terminal.
pub struct NonInteractive;

impl CollisionPrompt for NonInteractive {
    fn resolve(&self, name: &str) -> Result<Resolution> {
        Err(CliError::user(format!(
            "A patch named '{name}' already exists; use --force to overwrite it or choose another name"
        )))
    }
}

/// Pick the prompt matching the current session.
pub fn collision_prompt() -> Box<dyn CollisionPrompt> {
    if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() {
        Box::new(TerminalPrompt)
    } else {
        Box::new(NonInteractive)
    }
}
