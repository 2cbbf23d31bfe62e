//! Save command

use std::path::Path;

use colored::Colorize;
use stash_core::{SaveOutcome, Shelf};

use crate::error::{Result, exit};
use crate::interactive::{CollisionPrompt, Resolution};

/// Shelve every change in the working copy containing `cwd` as `name`.
///
/// Name collisions are resolved through `prompt` until the save goes
/// through or the prompt gives up. Returns the process exit code.
pub fn run_save(
    shelf: &Shelf,
    cwd: &Path,
    name: &str,
    force: bool,
    prompt: &dyn CollisionPrompt,
) -> Result<i32> {
    let repo = stash_vcs::detect(cwd)?;
    let mut name = name.to_string();
    let mut overwrite = force;

    loop {
        match shelf.save(repo.as_ref(), &name, overwrite) {
            Ok(SaveOutcome::Saved { name, files }) => {
                println!(
                    "{} {} changed file(s) as {}",
                    "Shelved".green().bold(),
                    files.len(),
                    name.cyan()
                );
                for file in files {
                    println!("  {file}");
                }
                return Ok(exit::SUCCESS);
            }
            Ok(SaveOutcome::NothingToShelve) => {
                eprintln!(
                    "{} No changes to shelve in {}",
                    "note:".yellow().bold(),
                    repo.root()
                );
                return Ok(exit::NOTHING_TO_DO);
            }
            Err(stash_core::Error::NameCollision { name: taken }) => {
                match prompt.resolve(&taken)? {
                    Resolution::Overwrite => overwrite = true,
                    Resolution::Rename(new_name) => {
                        name = new_name;
                        overwrite = false;
                    }
                }
            }
            Err(err) => return Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::error::CliError;
    use crate::interactive::NonInteractive;
    use stash_core::PatchStore;
    use stash_test_utils::TestWorkingCopy;
    use tempfile::TempDir;

    /// Hands out scripted answers and records the names it was asked about.
    struct Scripted {
        answers: RefCell<Vec<Resolution>>,
        asked: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(mut answers: Vec<Resolution>) -> Self {
            answers.reverse();
            Self {
                answers: RefCell::new(answers),
                asked: RefCell::new(Vec::new()),
            }
        }
    }

    impl CollisionPrompt for Scripted {
        fn resolve(&self, name: &str) -> Result<Resolution> {
            self.asked.borrow_mut().push(name.to_string());
            Ok(self.answers.borrow_mut().pop().unwrap())
        }
    }

    fn shelf() -> (TempDir, Shelf) {
        let temp = TempDir::new().unwrap();
        let shelf = Shelf::new(PatchStore::new(temp.path().join("store")));
        (temp, shelf)
    }

    #[test]
    fn clean_working_copy_exits_with_nothing_to_do() {
        let Some(wc) = TestWorkingCopy::mercurial() else {
            return;
        };
        let (_temp, shelf) = shelf();

        let code = run_save(&shelf, wc.root(), "work", false, &NonInteractive).unwrap();

        assert_eq!(code, exit::NOTHING_TO_DO);
    }

    #[test]
    fn collision_retries_with_new_name_until_free() {
        let Some(wc) = TestWorkingCopy::mercurial() else {
            return;
        };
        let (_temp, shelf) = shelf();
        wc.write("README.md", "first\n");
        run_save(&shelf, wc.root(), "work", false, &NonInteractive).unwrap();
        wc.write("README.md", "second\n");
        run_save(&shelf, wc.root(), "other", false, &NonInteractive).unwrap();
        wc.write("README.md", "third\n");
        let prompt = Scripted::new(vec![
            Resolution::Rename("other".into()),
            Resolution::Rename("third".into()),
        ]);

        let code = run_save(&shelf, wc.root(), "work", false, &prompt).unwrap();

        assert_eq!(code, exit::SUCCESS);
        assert_eq!(*prompt.asked.borrow(), vec!["work", "other"]);
        assert_eq!(shelf.list().unwrap(), vec!["other", "third", "work"]);
        assert!(shelf.show("third").unwrap().as_str().contains("+third"));
        assert!(shelf.show("work").unwrap().as_str().contains("+first"));
    }

    #[test]
    fn collision_overwrite_replaces_patch() {
        let Some(wc) = TestWorkingCopy::mercurial() else {
            return;
        };
        let (_temp, shelf) = shelf();
        wc.write("README.md", "first\n");
        run_save(&shelf, wc.root(), "work", false, &NonInteractive).unwrap();
        wc.write("README.md", "second\n");
        let prompt = Scripted::new(vec![Resolution::Overwrite]);

        run_save(&shelf, wc.root(), "work", false, &prompt).unwrap();

        assert_eq!(shelf.list().unwrap(), vec!["work"]);
        assert!(shelf.show("work").unwrap().as_str().contains("+second"));
    }

    #[test]
    fn declined_collision_is_a_user_error() {
        let Some(wc) = TestWorkingCopy::mercurial() else {
            return;
        };
        let (_temp, shelf) = shelf();
        wc.write("README.md", "first\n");
        run_save(&shelf, wc.root(), "work", false, &NonInteractive).unwrap();
        wc.write("README.md", "second\n");

        let err = run_save(&shelf, wc.root(), "work", false, &NonInteractive).unwrap_err();

        assert!(matches!(err, CliError::User { .. }), "got {err:?}");
        assert_eq!(err.exit_code(), exit::USER_ERROR);
        assert_eq!(wc.read("README.md"), "second\n");
    }
}
