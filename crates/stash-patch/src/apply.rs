//! Applying parsed diffs with conflict-marker fallback
//!
//! Each hunk is located by exact match of its context and removed lines,
//! searching outward from the position recorded in the hunk header (adjusted
//! by the displacement of the previous hunk). A hunk that cannot be located is
//! not dropped: the most similar region of the current file is wrapped in
//! conflict markers together with the hunk's incoming lines.

use similar::TextDiff;
use stash_fs::{NormalizedPath, io};

use crate::diff::{FilePatch, Hunk, UnifiedDiff};
use crate::{CONFLICT_INCOMING, CONFLICT_LOCAL, CONFLICT_SEPARATOR, Error, Result};

/// How far (in lines) from the expected position a conflict region is searched.
const CONFLICT_SEARCH_RADIUS: usize = 200;

/// Outcome of applying a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// Every hunk applied.
    Clean,
    /// Files (relative to the root) that received conflict markers.
    Conflicted(Vec<NormalizedPath>),
}

impl ApplyResult {
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }

    pub fn conflicted_files(&self) -> &[NormalizedPath] {
        match self {
            Self::Clean => &[],
            Self::Conflicted(files) => files,
        }
    }
}

/// Detailed outcome of [`apply_to_dir`].
///
/// `created` and `deleted` let version-control backends schedule the files
/// for addition or removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub result: ApplyResult,
    pub created: Vec<NormalizedPath>,
    pub deleted: Vec<NormalizedPath>,
}

/// Text produced by [`merge_hunks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedText {
    pub content: String,
    /// Number of hunks replaced by conflict regions.
    pub conflicts: usize,
}

#[derive(Debug, PartialEq, Eq)]
enum FileAction {
    Keep,
    Write {
        content: String,
        conflicted: bool,
        created: bool,
    },
    Delete,
}

/// Apply `diff` to the working copy rooted at `root`.
///
/// All paths are validated before anything is written, so a diff that tries
/// to escape the root does not leave a partially applied working copy.
pub fn apply_to_dir(root: &NormalizedPath, diff: &UnifiedDiff) -> Result<ApplyReport> {
    for file in &diff.files {
        validate_relative(file.path())?;
    }

    let mut created = Vec::new();
    let mut deleted = Vec::new();
    let mut conflicted = Vec::new();

    for file in &diff.files {
        let relative = NormalizedPath::new(file.path());
        let target = root.join(file.path());
        let current = io::read_text_if_exists(&target)?;

        match plan_file(file, current.as_deref()) {
            FileAction::Keep => {
                tracing::debug!(path = %relative, "File already up to date");
            }
            FileAction::Write {
                content,
                conflicted: has_conflicts,
                created: is_new,
            } => {
                io::write_text(&target, &content)?;
                if is_new {
                    created.push(relative.clone());
                }
                if has_conflicts {
                    tracing::warn!(path = %relative, "Conflict markers inserted");
                    conflicted.push(relative.clone());
                } else {
                    tracing::debug!(path = %relative, "Patched");
                }
            }
            FileAction::Delete => {
                io::remove_file(&target)?;
                tracing::debug!(path = %relative, "Deleted");
                deleted.push(relative.clone());
            }
        }

        if let Some(mode) = file.new_mode
            && target.is_file()
        {
            io::set_executable(&target, mode & 0o111 != 0)?;
        }
    }

    let result = if conflicted.is_empty() {
        ApplyResult::Clean
    } else {
        ApplyResult::Conflicted(conflicted)
    };
    Ok(ApplyReport {
        result,
        created,
        deleted,
    })
}

fn plan_file(file: &FilePatch, current: Option<&str>) -> FileAction {
    if file.is_deletion() {
        let Some(current) = current else {
            return FileAction::Keep;
        };
        let merged = merge_hunks(current, &file.hunks);
        return if merged.conflicts > 0 {
            FileAction::Write {
                content: merged.content,
                conflicted: true,
                created: false,
            }
        } else if merged.content.is_empty() {
            FileAction::Delete
        } else {
            // Lines the patch did not know about would be lost by deleting.
            let leftover: Vec<&str> = merged.content.split_inclusive('\n').collect();
            FileAction::Write {
                content: conflict_block(&leftover, &[]),
                conflicted: true,
                created: false,
            }
        };
    }

    if file.is_creation() {
        let incoming = file.new_content();
        return match current {
            None => FileAction::Write {
                content: incoming,
                conflicted: false,
                created: true,
            },
            Some(existing) if existing == incoming => FileAction::Keep,
            Some("") => FileAction::Write {
                content: incoming,
                conflicted: false,
                created: false,
            },
            Some(existing) => {
                let local: Vec<&str> = existing.split_inclusive('\n').collect();
                let new: Vec<&str> = incoming.split_inclusive('\n').collect();
                FileAction::Write {
                    content: conflict_block(&local, &new),
                    conflicted: true,
                    created: false,
                }
            }
        };
    }

    if file.hunks.is_empty() {
        return FileAction::Keep;
    }
    let base = current.unwrap_or_default();
    let merged = merge_hunks(base, &file.hunks);
    if current.is_some() && merged.conflicts == 0 && merged.content == base {
        return FileAction::Keep;
    }
    FileAction::Write {
        conflicted: merged.conflicts > 0,
        content: merged.content,
        created: false,
    }
}

/// Apply `hunks` to `current`, inserting conflict regions for hunks that
/// cannot be located.
pub fn merge_hunks(current: &str, hunks: &[Hunk]) -> MergedText {
    let lines: Vec<&str> = current.split_inclusive('\n').collect();
    let mut content = String::with_capacity(current.len());
    let mut cursor = 0;
    let mut displacement: isize = 0;
    let mut conflicts = 0;

    for hunk in hunks {
        let old = hunk.old_lines();
        let new = hunk.new_lines();
        let anchor = hunk.anchor();
        let expected = shift(anchor, displacement).clamp(cursor, lines.len());

        let (start, len) = match locate(&lines, &old, expected, cursor) {
            Some(start) => {
                content.extend(lines[cursor..start].iter().copied());
                content.extend(new.iter().copied());
                (start, old.len())
            }
            None => {
                let (start, len) = conflict_region(&lines, &old, expected, cursor);
                content.extend(lines[cursor..start].iter().copied());
                content.push_str(&conflict_block(&lines[start..start + len], &new));
                conflicts += 1;
                (start, len)
            }
        };
        cursor = start + len;
        displacement = start as isize - anchor as isize;
    }
    content.extend(lines[cursor..].iter().copied());

    MergedText { content, conflicts }
}

fn shift(anchor: usize, displacement: isize) -> usize {
    (anchor as isize + displacement).max(0) as usize
}

/// Find `old` in `lines` at or after `floor`, nearest to `expected` first.
fn locate(lines: &[&str], old: &[&str], expected: usize, floor: usize) -> Option<usize> {
    if old.is_empty() {
        return Some(expected.clamp(floor, lines.len()));
    }
    if lines.len() < floor + old.len() {
        return None;
    }
    let last = lines.len() - old.len();
    let expected = expected.clamp(floor, last);
    let matches_at = |pos: usize| lines[pos..pos + old.len()] == old[..];

    for distance in 0..=(last - floor) {
        let after = expected + distance;
        if after <= last && matches_at(after) {
            return Some(after);
        }
        if distance > 0
            && let Some(before) = expected.checked_sub(distance)
            && before >= floor
            && matches_at(before)
        {
            return Some(before);
        }
    }
    None
}

/// Pick the region of `lines` to show as the local side of a conflict:
/// the window most similar to `old`, ties going to the one nearest
/// `expected`.
fn conflict_region(lines: &[&str], old: &[&str], expected: usize, floor: usize) -> (usize, usize) {
    let available = lines.len().saturating_sub(floor);
    if old.is_empty() || available == 0 {
        return (expected.clamp(floor, lines.len()), 0);
    }

    let width = old.len().min(available);
    let last = lines.len() - width;
    let expected = expected.clamp(floor, last);
    let low = expected.saturating_sub(CONFLICT_SEARCH_RADIUS).max(floor);
    let high = (expected + CONFLICT_SEARCH_RADIUS).min(last);

    let mut best = (expected, 0.0_f32);
    for start in low..=high {
        let ratio = TextDiff::from_slices(old, &lines[start..start + width]).ratio();
        let closer = start.abs_diff(expected) < best.0.abs_diff(expected);
        if ratio > best.1 || (ratio == best.1 && closer) {
            best = (start, ratio);
        }
    }
    (best.0, width)
}

fn conflict_block(local: &[&str], incoming: &[&str]) -> String {
    let mut block = String::new();
    block.push_str(CONFLICT_LOCAL);
    block.push('\n');
    push_section(&mut block, local);
    block.push_str(CONFLICT_SEPARATOR);
    block.push('\n');
    push_section(&mut block, incoming);
    block.push_str(CONFLICT_INCOMING);
    block.push('\n');
    block
}

fn push_section(block: &mut String, lines: &[&str]) {
    for line in lines {
        block.push_str(line);
    }
    if !block.ends_with('\n') {
        block.push('\n');
    }
}

fn validate_relative(path: &str) -> Result<()> {
    let escapes = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.as_bytes().get(1) == Some(&b':')
        || path.split('/').any(|component| component == "..");
    if escapes {
        return Err(Error::PathOutsideRoot {
            path: path.to_string(),
        });
    }
    Ok(())
}
