//! Mercurial backend

use stash_fs::NormalizedPath;
use stash_patch::{ApplyResult, apply_to_dir, render::render_deletion};

use crate::cleanup::remove_added;
use crate::command::Tool;
use crate::provider::{DiffText, Repository, VcsKind};
use crate::{Error, Result};

/// `HGPLAIN` disables user configuration that changes output formats.
const HG: Tool = Tool::new("hg", &[("HGPLAIN", "1")]);

/// A Mercurial working copy driven through the `hg` command.
#[derive(Debug, Clone)]
pub struct MercurialRepository {
    root: NormalizedPath,
}

impl MercurialRepository {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    fn hg<I, S>(&self, args: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        HG.run(&self.root.to_native(), args)
    }

    /// Files with the given status flag (e.g. `--added`), relative to the root.
    fn files_with_status(&self, flag: &str) -> Result<Vec<String>> {
        let out = self.hg(["status", flag, "--no-status", "--print0"])?;
        Ok(out
            .split(|b| *b == 0)
            .filter(|entry| !entry.is_empty())
            .map(|entry| String::from_utf8_lossy(entry).into_owned())
            .collect())
    }

    fn capture(&self) -> Result<DiffText> {
        let root = self.root.to_native();
        let mut text = HG.run_text(&root, ["diff", "--git"])?;
        let listed: Vec<String> = DiffText::new(text.as_str())
            .parse()?
            .paths()
            .into_iter()
            .map(str::to_string)
            .collect();

        // Tracked files deleted without `hg remove`.
        for path in self.files_with_status("--deleted")? {
            if listed.contains(&path) {
                continue;
            }
            let base = HG.run_text(&root, ["cat", "--rev", ".", "--", exact(&path).as_str()])?;
            text.push_str(&render_deletion(&path, &base));
        }

        let diff = DiffText::from(text);
        // Anything the patch engine cannot read back must not be shelved.
        diff.parse()?;
        Ok(diff)
    }

    fn revert(&self) -> Result<()> {
        let added = self.files_with_status("--added")?;
        self.hg(["revert", "--all", "--no-backup"])?;
        remove_added(&self.root, &added, true)
    }

    fn apply(&self, diff: &DiffText) -> Result<ApplyResult> {
        let report = apply_to_dir(&self.root, &diff.parse()?)?;

        if !report.created.is_empty() {
            let mut args = vec!["add".to_string(), "--".into()];
            args.extend(report.created.iter().map(|p| exact(p.as_str())));
            if let Err(e) = self.hg(args) {
                tracing::warn!(error = %e, "Could not schedule created files for addition");
            }
        }
        if !report.deleted.is_empty() {
            let mut args = vec!["remove".to_string(), "--after".into(), "--".into()];
            args.extend(report.deleted.iter().map(|p| exact(p.as_str())));
            if let Err(e) = self.hg(args) {
                tracing::warn!(error = %e, "Could not schedule deleted files for removal");
            }
        }
        Ok(report.result)
    }
}

impl Repository for MercurialRepository {
    fn kind(&self) -> VcsKind {
        VcsKind::Mercurial
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

/// Mercurial reads file arguments as patterns; `path:` matches one file
/// literally.
fn exact(path: &str) -> String {
    format!("path:{path}")
}
