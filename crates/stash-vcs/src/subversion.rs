//! Subversion backend

use stash_fs::NormalizedPath;
use stash_patch::{ApplyResult, apply_to_dir, render::render_deletion};

use crate::cleanup::remove_added;
use crate::command::Tool;
use crate::provider::{DiffText, Repository, VcsKind};
use crate::{Error, Result};

const SVN: Tool = Tool::new("svn", &[]);

/// Error code `svn cat` reports for directories.
const SVN_ERR_IS_DIRECTORY: &str = "E195007";

/// Item status characters in the first column of `svn status`.
const ITEM_STATUS: &str = "ACDIMRX?!~";
/// Characters allowed in the remaining six status columns.
const OTHER_STATUS: &str = " CMLSKOTB+X*";

/// One line of `svn status` output.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusEntry {
    code: char,
    path: String,
}

/// A Subversion working copy driven through the `svn` command.
#[derive(Debug, Clone)]
pub struct SubversionRepository {
    root: NormalizedPath,
}

impl SubversionRepository {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    fn svn<I, S>(&self, args: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        SVN.run(&self.root.to_native(), args)
    }

    fn svn_text<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        SVN.run_text(&self.root.to_native(), args)
    }

    fn status(&self) -> Result<Vec<StatusEntry>> {
        let out = self.svn(["status"])?;
        Ok(parse_status(&String::from_utf8_lossy(&out)))
    }

    fn capture(&self) -> Result<DiffText> {
        let mut text = self.svn_text(["diff", "--git"])?;
        let already_listed: Vec<String> = DiffText::new(text.as_str())
            .parse()?
            .paths()
            .into_iter()
            .map(str::to_string)
            .collect();

        // Tracked files deleted without `svn rm` are not part of `svn diff`.
        for entry in self.status()? {
            if entry.code != '!' || already_listed.contains(&entry.path) {
                continue;
            }
            match self.svn_text(["cat", "-r", "BASE", "--", peg_safe(&entry.path).as_str()]) {
                Ok(base) => text.push_str(&render_deletion(&entry.path, &base)),
                Err(Error::CommandFailed { ref stderr, .. })
                    if stderr.contains(SVN_ERR_IS_DIRECTORY) =>
                {
                    tracing::warn!(path = %entry.path, "Missing directory is not captured");
                }
                Err(e) => return Err(e),
            }
        }

        let diff = DiffText::from(text);
        diff.parse()?;
        Ok(diff)
    }

    fn revert(&self) -> Result<()> {
        let added: Vec<String> = self
            .status()?
            .into_iter()
            .filter(|entry| entry.code == 'A')
            .map(|entry| entry.path)
            .collect();
        self.svn(["revert", "-R", "-q", "."])?;
        remove_added(&self.root, &added, false)
    }

    fn apply(&self, diff: &DiffText) -> Result<ApplyResult> {
        let report = apply_to_dir(&self.root, &diff.parse()?)?;

        if !report.created.is_empty() {
            let mut args = vec!["add".to_string(), "--parents".into(), "--".into()];
            args.extend(report.created.iter().map(|p| peg_safe(p.as_str())));
            if let Err(e) = self.svn(args) {
                tracing::warn!(error = %e, "Could not schedule created files for addition");
            }
        }
        if !report.deleted.is_empty() {
            let mut args = vec!["delete".to_string(), "--force".into(), "--".into()];
            args.extend(report.deleted.iter().map(|p| peg_safe(p.as_str())));
            if let Err(e) = self.svn(args) {
                tracing::warn!(error = %e, "Could not schedule deleted files for removal");
            }
        }
        Ok(report.result)
    }
}

impl Repository for SubversionRepository {
    fn kind(&self) -> VcsKind {
        VcsKind::Subversion
    }

    fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn capture_changes(&self) -> Result<DiffText> {
        self.capture().map_err(|e| Error::capture(self.kind(), e))
    }

    fn revert_all(&self) -> Result<()> {
        self.revert().map_err(|e| Error::revert(self.kind(), e))
    }

    fn apply_patch(&self, diff: &DiffText) -> Result<ApplyResult> {
        self.apply(diff).map_err(|e| Error::apply(self.kind(), e))
    }
}

/// Parse `svn status` output, skipping conflict summaries and tree-conflict
/// detail lines.
fn parse_status(text: &str) -> Vec<StatusEntry> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim_end_matches('\r');
            let mut chars = line.chars();
            let code = chars.next()?;
            if !ITEM_STATUS.contains(code) {
                return None;
            }
            let columns: String = chars.by_ref().take(7).collect();
            if columns.chars().count() != 7 || !columns.chars().all(|c| OTHER_STATUS.contains(c)) {
                return None;
            }
            let path = chars.as_str();
            if path.is_empty() {
                return None;
            }
            Some(StatusEntry {
                code,
                path: path.replace('\\', "/"),
            })
        })
        .collect()
}

/// Subversion reads everything after the last `@` as a peg revision.
fn peg_safe(path: &str) -> String {
    if path.contains('@') {
        format!("{path}@")
    } else {
        path.to_string()
    }
}
