//! Applying diffs to real directories

use std::fs;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use similar::{ChangeTag, TextDiff};
use stash_fs::NormalizedPath;
use stash_patch::{ApplyResult, Error, UnifiedDiff, apply_to_dir};
use tempfile::TempDir;

fn sandbox() -> (TempDir, NormalizedPath) {
    let temp = TempDir::new().unwrap();
    let root = NormalizedPath::new(temp.path());
    (temp, root)
}

const WORK: &str = "\
diff --git a/a.txt b/a.txt
--- a/a.txt
+++ b/a.txt
@@ -1 +1 @@
-foo
+bar
diff --git a/b.txt b/b.txt
new file mode 100644
--- /dev/null
+++ b/b.txt
@@ -0,0 +1 @@
+hello
";

#[test]
fn clean_apply_creates_and_modifies() {
    let (temp, root) = sandbox();
    fs::write(temp.path().join("a.txt"), "foo\n").unwrap();

    let report = apply_to_dir(&root, &UnifiedDiff::parse(WORK).unwrap()).unwrap();

    assert_eq!(report.result, ApplyResult::Clean);
    assert_eq!(report.created, vec![NormalizedPath::new("b.txt")]);
    assert!(report.deleted.is_empty());
    assert_eq!(fs::read_to_string(temp.path().join("a.txt")).unwrap(), "bar\n");
    assert_eq!(fs::read_to_string(temp.path().join("b.txt")).unwrap(), "hello\n");
}

#[test]
fn diverged_file_gets_conflict_markers() {
    let (temp, root) = sandbox();
    fs::write(temp.path().join("a.txt"), "baz\n").unwrap();

    let report = apply_to_dir(&root, &UnifiedDiff::parse(WORK).unwrap()).unwrap();

    assert_eq!(
        report.result,
        ApplyResult::Conflicted(vec![NormalizedPath::new("a.txt")])
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("a.txt")).unwrap(),
        "<<<<<<< local\nbaz\n=======\nbar\n>>>>>>> incoming\n"
    );
    assert_eq!(fs::read_to_string(temp.path().join("b.txt")).unwrap(), "hello\n");
}

#[test]
fn deletion_removes_matching_file() {
    let (temp, root) = sandbox();
    fs::create_dir(temp.path().join("dir")).unwrap();
    fs::write(temp.path().join("dir/old.txt"), "bye\n").unwrap();
    let diff = UnifiedDiff::parse(
        "diff --git a/dir/old.txt b/dir/old.txt\ndeleted file mode 100644\n--- a/dir/old.txt\n+++ /dev/null\n@@ -1 +0,0 @@\n-bye\n",
    )
    .unwrap();

    let report = apply_to_dir(&root, &diff).unwrap();

    assert!(report.result.is_clean());
    assert_eq!(report.deleted, vec![NormalizedPath::new("dir/old.txt")]);
    assert!(!temp.path().join("dir/old.txt").exists());
}

#[rstest]
#[case("../outside.txt")]
#[case("a/../../outside.txt")]
fn paths_escaping_root_are_rejected_before_writing(#[case] path: &str) {
    let (temp, root) = sandbox();
    let text = format!(
        "diff --git a/inside.txt b/inside.txt\nnew file mode 100644\n--- /dev/null\n+++ b/inside.txt\n@@ -0,0 +1 @@\n+x\n--- /dev/null\n+++ b/{path}\n@@ -0,0 +1 @@\n+x\n"
    );
    let diff = UnifiedDiff::parse(&text).unwrap();

    let err = apply_to_dir(&root, &diff).unwrap_err();

    assert!(matches!(err, Error::PathOutsideRoot { .. }), "got {err:?}");
    assert!(!temp.path().join("inside.txt").exists());
}

#[cfg(unix)]
#[test]
fn executable_mode_is_honoured() {
    use std::os::unix::fs::PermissionsExt;

    let (temp, root) = sandbox();
    let diff = UnifiedDiff::parse(
        "diff --git a/run.sh b/run.sh\nnew file mode 100755\n--- /dev/null\n+++ b/run.sh\n@@ -0,0 +1 @@\n+#!/bin/sh\n",
    )
    .unwrap();

    apply_to_dir(&root, &diff).unwrap();

    let mode = fs::metadata(temp.path().join("run.sh"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o111, 0o111);
}

#[cfg(unix)]
#[test]
fn mode_only_change_clears_executable_bit() {
    use std::os::unix::fs::PermissionsExt;

    let (temp, root) = sandbox();
    let script = temp.path().join("run.sh");
    fs::write(&script, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    let diff =
        UnifiedDiff::parse("diff --git a/run.sh b/run.sh\nold mode 100755\nnew mode 100644\n")
            .unwrap();

    let report = apply_to_dir(&root, &diff).unwrap();

    assert_eq!(report.result, ApplyResult::Clean);
    let mode = fs::metadata(&script).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0);
    assert_eq!(fs::read_to_string(&script).unwrap(), "#!/bin/sh\n");
}

/// Renders a git-style diff from `similar`'s hunks. Header counts come from
/// the emitted lines, since `similar` miscounts them when the old side lacks
/// a trailing newline.
fn render_unified(path: &str, old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut out = format!("--- a/{path}\n+++ b/{path}\n");
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        let Some(first) = hunk.ops().first() else {
            continue;
        };
        let (old_start, new_start) = (first.old_range().start, first.new_range().start);
        let (mut old_len, mut new_len) = (0, 0);
        let mut body = String::new();
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Equal => {
                    old_len += 1;
                    new_len += 1;
                    ' '
                }
                ChangeTag::Delete => {
                    old_len += 1;
                    '-'
                }
                ChangeTag::Insert => {
                    new_len += 1;
                    '+'
                }
            };
            body.push(sign);
            body.push_str(change.value());
            if change.missing_newline() {
                body.push_str("\n\\ No newline at end of file\n");
            }
        }
        out.push_str(&format!(
            "@@ -{} +{} @@\n",
            hunk_range(old_start, old_len),
            hunk_range(new_start, new_len)
        ));
        out.push_str(&body);
    }
    out
}

fn hunk_range(start: usize, len: usize) -> String {
    let start = if len == 0 { start } else { start + 1 };
    format!("{start},{len}")
}

fn content_strategy() -> impl Strategy<Value = String> {
    (prop::collection::vec("[a-c]{0,3}", 0..24), any::<bool>()).prop_map(|(lines, trailing)| {
        let mut text = lines.join("\n");
        if trailing && !text.is_empty() {
            text.push('\n');
        }
        text
    })
}

proptest! {
    #[test]
    fn generated_diff_reproduces_target(old in content_strategy(), new in content_strategy()) {
        let (temp, root) = sandbox();
        fs::write(temp.path().join("f.txt"), &old).unwrap();
        let text = render_unified("f.txt", &old, &new);

        let diff = UnifiedDiff::parse(&text).unwrap();
        let report = apply_to_dir(&root, &diff).unwrap();

        prop_assert!(report.result.is_clean());
        prop_assert_eq!(fs::read_to_string(temp.path().join("f.txt")).unwrap(), new);
    }
}
