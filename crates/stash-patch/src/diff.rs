//! Unified diff model and parser

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("valid hunk header regex")
});

/// Labels Subversion appends after a tab to mark a side that does not exist.
const NONEXISTENT_LABEL: &str = "(nonexistent)";
const DEV_NULL: &str = "/dev/null";

/// A parsed unified diff covering any number of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedDiff {
    pub files: Vec<FilePatch>,
}

/// Changes to a single file.
///
/// Paths are relative to the working-copy root with the `a/` and `b/`
/// prefixes already stripped. `None` means the side does not exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePatch {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    /// Mode from `new file mode` or `new mode` headers.
    pub new_mode: Option<u32>,
    created: bool,
    deleted: bool,
    pub hunks: Vec<Hunk>,
}

/// One `@@` section of a file patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
    pub lines: Vec<HunkLine>,
}

/// A hunk body line. The text keeps its trailing `\n` unless the diff marked
/// it with `\ No newline at end of file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkLine {
    Context(String),
    Removed(String),
    Added(String),
}

impl HunkLine {
    fn text_mut(&mut self) -> &mut String {
        match self {
            Self::Context(text) | Self::Removed(text) | Self::Added(text) => text,
        }
    }
}

impl Hunk {
    /// Lines the hunk expects to find: context and removals.
    pub fn old_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                HunkLine::Context(text) | HunkLine::Removed(text) => Some(text.as_str()),
                HunkLine::Added(_) => None,
            })
            .collect()
    }

    /// Lines the hunk leaves behind: context and additions.
    pub fn new_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                HunkLine::Context(text) | HunkLine::Added(text) => Some(text.as_str()),
                HunkLine::Removed(_) => None,
            })
            .collect()
    }

    /// Zero-based index in the old file where the hunk's old lines begin.
    ///
    /// For pure insertions (`old_len == 0`) the header names the line after
    /// which the new lines go, so the index is `old_start` itself.
    pub fn anchor(&self) -> usize {
        if self.old_len == 0 {
            self.old_start
        } else {
            self.old_start.saturating_sub(1)
        }
    }
}

impl FilePatch {
    /// The working-copy path this patch touches.
    pub fn path(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or_default()
    }

    /// Whether the patch creates the file.
    pub fn is_creation(&self) -> bool {
        self.created || (self.old_path.is_none() && self.new_path.is_some())
    }

    /// Whether the patch deletes the file.
    pub fn is_deletion(&self) -> bool {
        self.deleted || (self.new_path.is_none() && self.old_path.is_some())
    }

    /// Full content of the file before the patch, as far as the hunks tell.
    pub fn old_content(&self) -> String {
        self.hunks.iter().flat_map(|h| h.old_lines()).collect()
    }

    /// Full content of the file after the patch, as far as the hunks tell.
    pub fn new_content(&self) -> String {
        self.hunks.iter().flat_map(|h| h.new_lines()).collect()
    }

    fn has_headers(&self) -> bool {
        self.old_path.is_some() || self.new_path.is_some() || self.created || self.deleted
    }
}

impl UnifiedDiff {
    /// Parse a git-style diff, stripping one leading path component
    /// (the `a/` and `b/` prefixes), like `patch -p1`.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_strip(text, 1)
    }

    /// Parse a diff, stripping `strip` leading path components.
    pub fn parse_with_strip(text: &str, strip: usize) -> Result<Self> {
        Parser::new(text, strip).run()
    }

    /// Whether the diff contains no file changes.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// All paths touched by the diff, in diff order.
    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(FilePatch::path).collect()
    }
}

struct Parser<'a> {
    lines: Vec<&'a str>,
    strip: usize,
    pos: usize,
    files: Vec<FilePatch>,
    current: Option<FilePatch>,
    /// Whether the current section already consumed a `---`/`+++` pair.
    current_has_markers: bool,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, strip: usize) -> Self {
        let mut lines: Vec<&str> = text.split('\n').collect();
        if text.ends_with('\n') {
            lines.pop();
        }
        Self {
            lines,
            strip,
            pos: 0,
            files: Vec::new(),
            current: None,
            current_has_markers: false,
        }
    }

    fn run(mut self) -> Result<UnifiedDiff> {
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            let line_no = self.pos + 1;

            if let Some(rest) = line.strip_prefix("diff --git ") {
                self.finish_file();
                let (old, new) = split_git_header(rest)
                    .ok_or_else(|| Error::malformed(line_no, "unreadable 'diff --git' header"))?;
                self.current = Some(FilePatch {
                    old_path: Some(self.strip_path(old, line_no)?),
                    new_path: Some(self.strip_path(new, line_no)?),
                    ..FilePatch::default()
                });
                self.pos += 1;
            } else if line.starts_with("--- ")
                && self
                    .lines
                    .get(self.pos + 1)
                    .is_some_and(|next| next.starts_with("+++ "))
            {
                self.parse_markers(line_no)?;
                self.pos += 2;
            } else if line.starts_with("@@") {
                self.parse_hunk(line_no)?;
            } else if let Some(mode) = line.strip_prefix("new file mode ") {
                let file = self.current_mut(line_no)?;
                file.created = true;
                file.new_mode = u32::from_str_radix(mode.trim(), 8).ok();
                self.pos += 1;
            } else if let Some(mode) = line.strip_prefix("new mode ") {
                let file = self.current_mut(line_no)?;
                file.new_mode = u32::from_str_radix(mode.trim(), 8).ok();
                self.pos += 1;
            } else if line.starts_with("deleted file mode ") {
                self.current_mut(line_no)?.deleted = true;
                self.pos += 1;
            } else if line.starts_with("GIT binary patch")
                || line.starts_with("Binary files ")
                || line.starts_with("Cannot display: file marked as a binary type")
            {
                let path = self
                    .current
                    .as_ref()
                    .map(|f| f.path().to_string())
                    .unwrap_or_default();
                return Err(Error::Binary { path });
            } else if let Some(path) = line.strip_prefix("Property changes on: ") {
                return Err(Error::Properties {
                    path: path.trim().to_string(),
                });
            } else if line.starts_with("rename from ") || line.starts_with("copy from ") {
                return Err(Error::malformed(
                    line_no,
                    "renames and copies are not supported; commit or revert them first",
                ));
            } else {
                // Index lines, separators and other noise.
                self.pos += 1;
            }
        }
        self.finish_file();
        Ok(UnifiedDiff { files: self.files })
    }

    fn finish_file(&mut self) {
        if let Some(file) = self.current.take()
            && file.has_headers()
        {
            self.files.push(file);
        }
        self.current_has_markers = false;
    }

    fn current_mut(&mut self, line_no: usize) -> Result<&mut FilePatch> {
        self.current
            .as_mut()
            .ok_or_else(|| Error::malformed(line_no, "file header outside of a file section"))
    }

    fn parse_markers(&mut self, line_no: usize) -> Result<()> {
        let old_line: &'a str = self.lines[self.pos];
        let new_line: &'a str = self.lines[self.pos + 1];
        let old = marker_path(&old_line[4..]);
        let new = marker_path(&new_line[4..]);

        // A second marker pair, or markers after hunks, start a new section
        // (plain diffs without `diff --git` lines).
        let starts_new = self
            .current
            .as_ref()
            .is_none_or(|f| self.current_has_markers || !f.hunks.is_empty());
        if starts_new {
            self.finish_file();
            self.current = Some(FilePatch::default());
        }

        let old = old.map(|p| self.strip_path(p, line_no)).transpose()?;
        let new = new.map(|p| self.strip_path(p, line_no + 1)).transpose()?;
        let file = self.current_mut(line_no)?;
        if old.is_none() {
            file.created = true;
        }
        if new.is_none() {
            file.deleted = true;
        }
        file.old_path = old.or(file.old_path.take());
        file.new_path = new.or(file.new_path.take());
        if file.created {
            file.old_path = None;
        }
        if file.deleted {
            file.new_path = None;
        }
        self.current_has_markers = true;
        Ok(())
    }

    fn parse_hunk(&mut self, line_no: usize) -> Result<()> {
        let header = self.lines[self.pos];
        let caps = HUNK_HEADER
            .captures(header)
            .ok_or_else(|| Error::malformed(line_no, format!("bad hunk header '{}'", header)))?;
        let number = |idx: usize, default: usize| -> Result<usize> {
            match caps.get(idx) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| Error::malformed(line_no, "hunk range out of bounds")),
                None => Ok(default),
            }
        };
        let old_start = number(1, 0)?;
        let old_len = number(2, 1)?;
        let new_start = number(3, 0)?;
        let new_len = number(4, 1)?;
        self.pos += 1;

        let mut lines: Vec<HunkLine> = Vec::new();
        let (mut old_left, mut new_left) = (old_len, new_len);
        loop {
            let Some(&line) = self.lines.get(self.pos) else {
                break;
            };
            if line.starts_with('\\') {
                // "\ No newline at end of file" applies to the previous line.
                if let Some(last) = lines.last_mut() {
                    let text = last.text_mut();
                    if text.ends_with('\n') {
                        text.pop();
                    }
                }
                self.pos += 1;
                continue;
            }
            if old_left == 0 && new_left == 0 {
                break;
            }
            let mut chars = line.chars();
            let tag = chars.next();
            let text = format!("{}\n", chars.as_str());
            match tag {
                Some(' ') | None if old_left > 0 && new_left > 0 => {
                    old_left -= 1;
                    new_left -= 1;
                    lines.push(HunkLine::Context(text));
                }
                Some('-') if old_left > 0 => {
                    old_left -= 1;
                    lines.push(HunkLine::Removed(text));
                }
                Some('+') if new_left > 0 => {
                    new_left -= 1;
                    lines.push(HunkLine::Added(text));
                }
                _ => {
                    return Err(Error::malformed(
                        self.pos + 1,
                        format!(
                            "hunk ended early ({} old and {} new lines missing)",
                            old_left, new_left
                        ),
                    ));
                }
            }
            self.pos += 1;
        }

        if old_left != 0 || new_left != 0 {
            return Err(Error::malformed(
                self.pos + 1,
                "unexpected end of diff inside a hunk",
            ));
        }

        self.current_mut(line_no)?.hunks.push(Hunk {
            old_start,
            old_len,
            new_start,
            new_len,
            lines,
        });
        Ok(())
    }

    fn strip_path(&self, path: &str, line_no: usize) -> Result<String> {
        let mut components = path.split('/').filter(|c| !c.is_empty());
        for _ in 0..self.strip {
            if components.next().is_none() {
                break;
            }
        }
        let stripped = components.collect::<Vec<_>>().join("/");
        if stripped.is_empty() {
            return Err(Error::malformed(
                line_no,
                format!("path '{}' has too few components", path),
            ));
        }
        Ok(stripped)
    }
}

/// Extract the path from a `---`/`+++` line, dropping timestamps and labels.
/// Returns `None` for `/dev/null` and Subversion's `(nonexistent)` side.
fn marker_path(rest: &str) -> Option<&str> {
    let (path, label) = match rest.split_once('\t') {
        Some((path, label)) => (path, label.trim()),
        None => (rest, ""),
    };
    let path = unquote(path.trim_end());
    if path == DEV_NULL || label == NONEXISTENT_LABEL {
        None
    } else {
        Some(path)
    }
}

fn unquote(path: &str) -> &str {
    path.strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(path)
}

/// Split the `a/<path> b/<path>` tail of a `diff --git` line.
///
/// When both sides name the same file the split is unambiguous even if the
/// path contains spaces; otherwise split on the first ` b/`.
fn split_git_header(rest: &str) -> Option<(&str, &str)> {
    let rest = rest.trim_end();
    if rest.len() % 2 == 1 {
        let half = rest.len() / 2;
        if rest.is_char_boundary(half) && rest.as_bytes()[half] == b' ' {
            let (left, right) = (&rest[..half], &rest[half + 1..]);
            if left.len() > 2 && left.get(2..) == right.get(2..) {
                return Some((unquote(left), unquote(right)));
            }
        }
    }
    rest.find(" b/")
        .map(|idx| (unquote(&rest[..idx]), unquote(&rest[idx + 1..])))
}
