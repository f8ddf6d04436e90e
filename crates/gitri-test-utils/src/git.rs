//! Real git repositories for end-to-end tests.
//!
//! Everything here shells out to the `git` CLI so fixtures are built
//! independently of the backend under test.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Run `git` in `dir` and return its trimmed stdout.
///
/// # Panics
/// Panics if git cannot be started or exits with a failure status.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|e| panic!("git: failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "git: `git {args:?}` failed in {}:\n{}",
            dir.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Set a commit identity and disable signing for the repository at `dir`.
pub fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.email", "test@test.com"]);
    git(dir, &["config", "user.name", "Test User"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// Write `name` with `content`, commit it, and return the new HEAD.
pub fn commit_file(dir: &Path, name: &str, content: &str) -> String {
    let file = dir.join(name);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("commit_file: failed to create {}: {e}", parent.display()));
    }
    fs::write(&file, content)
        .unwrap_or_else(|e| panic!("commit_file: failed to write {}: {e}", file.display()));
    git(dir, &["add", name]);
    git(dir, &["commit", "-q", "-m", &format!("update {name}")]);
    head(dir)
}

/// Commit id of HEAD in `dir`.
pub fn head(dir: &Path) -> String {
    git(dir, &["rev-parse", "HEAD"])
}

/// Initialise an upstream repository at `path` on `main` with one commit.
///
/// Returns the commit id.
pub fn upstream_repo(path: &Path) -> String {
    fs::create_dir_all(path)
        .unwrap_or_else(|e| panic!("upstream_repo: failed to create {}: {e}", path.display()));
    git(path, &["init", "-q"]);
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    configure_identity(path);
    commit_file(path, "README.md", "# upstream\n")
}

/// Initialise a manifest repository at `path` whose `default.xml` is `xml`.
///
/// Returns the commit id.
pub fn manifest_repo(path: &Path, xml: &str) -> String {
    upstream_repo(path);
    commit_file(path, "default.xml", xml)
}

/// Manifest XML declaring remote `origin` at `fetch` and one repository per
/// name, each tracking `main`.
pub fn manifest_xml(fetch: &str, repos: &[&str]) -> String {
    let mut xml = format!(
        "<manifest>\n  <remote name=\"origin\" fetch=\"{fetch}\"/>\n  <default remote=\"origin\" revision=\"main\"/>\n"
    );
    for repo in repos {
        xml.push_str(&format!("  <project name=\"{repo}\" path=\"{repo}\"/>\n"));
    }
    xml.push_str("</manifest>\n");
    xml
}
