//! Version-control fixtures at two realism levels.
//!
//! Choose the lowest-realism fixture that satisfies your test's needs.
//! Real fixtures need `hg`/`svn` on PATH; check [`hg_available`] or
//! [`svn_available`] first and skip the test otherwise.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

/// Environment every fixture command runs with.
const FIXTURE_ENV: &[(&str, &str)] = &[("HGPLAIN", "1"), ("HGUSER", "Test User <test@test.com>")];

/// Creates an empty `.hg` directory.
///
/// Realism level: **FAKE**: satisfies working-copy detection only.
///
/// # Panics
/// Panics if the directory cannot be created.
pub fn fake_hg_dir(path: &Path) {
    fs::create_dir_all(path.join(".hg"))
        .unwrap_or_else(|e| panic!("fake_hg_dir: failed to create .hg: {e}"));
}

/// Creates an empty `.svn` directory.
///
/// Realism level: **FAKE**: satisfies working-copy detection only.
///
/// # Panics
/// Panics if the directory cannot be created.
pub fn fake_svn_dir(path: &Path) {
    fs::create_dir_all(path.join(".svn"))
        .unwrap_or_else(|e| panic!("fake_svn_dir: failed to create .svn: {e}"));
}

fn tool_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Whether the `hg` command can be run.
pub fn hg_available() -> bool {
    tool_available("hg")
}

/// Whether both `svn` and `svnadmin` can be run.
pub fn svn_available() -> bool {
    tool_available("svn") && tool_available("svnadmin")
}

/// Run `program args` in `cwd` and return stdout.
///
/// # Panics
/// Panics if the command cannot be started or exits unsuccessfully.
pub fn run(program: &str, cwd: &Path, args: &[&str]) -> String {
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .envs(FIXTURE_ENV.iter().copied())
        .stdin(Stdio::null())
        .output()
        .unwrap_or_else(|e| panic!("failed to run `{program} {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "`{program} {args:?}` failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Initialises a Mercurial repository with one committed `README.md`.
///
/// Realism level: **REAL WITH HISTORY**.
///
/// # Panics
/// Panics if any hg operation fails.
pub fn real_hg_repo_with_commit(path: &Path) {
    run("hg", path, &["init"]);
    fs::write(path.join("README.md"), "# Test\n")
        .unwrap_or_else(|e| panic!("real_hg_repo_with_commit: failed to write README.md: {e}"));
    run("hg", path, &["add", "README.md"]);
    run("hg", path, &["commit", "-m", "Initial commit"]);
}

/// Creates a Subversion repository in `server` and checks it out into
/// `working_copy`, with one committed `README.md`.
///
/// Realism level: **REAL WITH HISTORY**.
///
/// # Panics
/// Panics if any svn operation fails.
pub fn real_svn_checkout_with_commit(server: &Path, working_copy: &Path) {
    run("svnadmin", server, &["create", "--fs-type", "fsfs", "repo"]);
    let repo = server.join("repo").to_string_lossy().replace('\\', "/");
    let url = if repo.starts_with('/') {
        format!("file://{repo}")
    } else {
        format!("file:///{repo}")
    };
    run("svn", server, &["checkout", "-q", &url, &working_copy.to_string_lossy()]);
    fs::write(working_copy.join("README.md"), "# Test\n").unwrap_or_else(|e| {
        panic!("real_svn_checkout_with_commit: failed to write README.md: {e}")
    });
    run("svn", working_copy, &["add", "-q", "README.md"]);
    run(
        "svn",
        working_copy,
        &["commit", "-q", "-m", "Initial commit", "--username", "test"],
    );
}
