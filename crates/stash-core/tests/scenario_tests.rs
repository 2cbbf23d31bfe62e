//! End-to-end shelf scenarios against real working copies. Each test skips
//! itself when the backend tool is not installed.

use pretty_assertions::assert_eq;
use rstest::rstest;
use stash_core::{Error, PatchStore, SaveOutcome, Shelf};
use stash_fs::NormalizedPath;
use stash_test_utils::{Backend, TestWorkingCopy};
use stash_vcs::{ApplyResult, detect};
use tempfile::TempDir;

fn shelf() -> (TempDir, Shelf) {
    let temp = TempDir::new().unwrap();
    let shelf = Shelf::new(PatchStore::new(temp.path().join("store")));
    (temp, shelf)
}

#[rstest]
#[case::mercurial(Backend::Mercurial)]
#[case::subversion(Backend::Subversion)]
fn shelve_then_apply_onto_diverged_base(#[case] backend: Backend) {
    let Some(wc) = TestWorkingCopy::for_backend(backend) else {
        return;
    };
    let (_store, shelf) = shelf();
    wc.write("a.txt", "foo\n");
    wc.add("a.txt");
    wc.commit("add a.txt");

    wc.write("a.txt", "bar\n");
    wc.write("b.txt", "hello\n");
    wc.add("b.txt");
    let repo = detect(wc.root()).unwrap();

    let outcome = shelf.save(repo.as_ref(), "work", false).unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved { .. }));
    assert_eq!(wc.read("a.txt"), "foo\n");
    wc.assert_file_not_exists("b.txt");
    assert_eq!(shelf.list().unwrap(), vec!["work"]);

    wc.write("a.txt", "baz\n");
    wc.commit("diverge");

    let result = shelf.apply(repo.as_ref(), "work").unwrap();

    assert_eq!(
        result,
        ApplyResult::Conflicted(vec![NormalizedPath::new("a.txt")])
    );
    wc.assert_file_contains("a.txt", "<<<<<<< local\nbaz\n=======\nbar\n>>>>>>> incoming\n");
    wc.assert_file_exists("b.txt");
    assert_eq!(wc.read("b.txt"), "hello\n");
    assert_eq!(shelf.list().unwrap(), vec!["work"]);
}

#[rstest]
#[case::mercurial(Backend::Mercurial)]
#[case::subversion(Backend::Subversion)]
fn clean_apply_reproduces_working_copy(#[case] backend: Backend) {
    let Some(wc) = TestWorkingCopy::for_backend(backend) else {
        return;
    };
    let (_store, shelf) = shelf();
    wc.write("edit.txt", "1\n2\n3\n");
    wc.write("drop.txt", "drop me\n");
    wc.write("lost.txt", "deleted on disk\n");
    for path in ["edit.txt", "drop.txt", "lost.txt"] {
        wc.add(path);
    }
    wc.commit("base");

    wc.write("edit.txt", "1\ntwo\n3\nno newline");
    wc.write("sub/new.txt", "added\n");
    wc.add("sub/new.txt");
    wc.remove("drop.txt");
    wc.delete("lost.txt");
    let repo = detect(wc.root()).unwrap();
    let before = repo.capture_changes().unwrap();

    shelf.save(repo.as_ref(), "work", false).unwrap();
    assert!(repo.capture_changes().unwrap().is_empty());
    assert!(wc.is_clean(), "status after save:\n{}", wc.status());

    let result = shelf.apply(repo.as_ref(), "work").unwrap();

    assert!(result.is_clean());
    assert!(shelf.list().unwrap().is_empty());
    assert_eq!(wc.read("edit.txt"), "1\ntwo\n3\nno newline");
    assert_eq!(wc.read("sub/new.txt"), "added\n");
    wc.assert_file_not_exists("drop.txt");
    wc.assert_file_not_exists("lost.txt");
    // Additions and removals are scheduled again, though missing files now
    // show up as regular removals.
    let after = repo.capture_changes().unwrap();
    assert_eq!(sorted_paths(&after), sorted_paths(&before));
}

fn sorted_paths(diff: &stash_vcs::DiffText) -> Vec<String> {
    let mut paths: Vec<String> = diff
        .parse()
        .unwrap()
        .paths()
        .into_iter()
        .map(str::to_string)
        .collect();
    paths.sort();
    paths
}

#[rstest]
#[case::mercurial(Backend::Mercurial)]
#[case::subversion(Backend::Subversion)]
fn save_on_clean_working_copy_does_nothing(#[case] backend: Backend) {
    let Some(wc) = TestWorkingCopy::for_backend(backend) else {
        return;
    };
    let (_store, shelf) = shelf();
    let repo = detect(wc.root()).unwrap();

    let outcome = shelf.save(repo.as_ref(), "work", false).unwrap();

    assert_eq!(outcome, SaveOutcome::NothingToShelve);
    assert!(shelf.list().unwrap().is_empty());
}

#[test]
fn collision_leaves_working_copy_dirty() {
    let Some(wc) = TestWorkingCopy::mercurial() else {
        return;
    };
    let (_store, shelf) = shelf();
    let repo = detect(wc.root()).unwrap();
    wc.write("README.md", "first\n");
    shelf.save(repo.as_ref(), "work", false).unwrap();
    wc.write("README.md", "second\n");

    let err = shelf.save(repo.as_ref(), "work", false).unwrap_err();

    assert!(matches!(err, Error::NameCollision { .. }), "got {err:?}");
    assert_eq!(wc.read("README.md"), "second\n");
    assert!(shelf.show("work").unwrap().as_str().contains("+first"));
}
