//! Tests for the gitri binary.
//!
//! End-to-end cases build real upstream and manifest repositories with the
//! `git` CLI and run the compiled binary against them.

use assert_cmd::Command;
use gitri_test_utils::git::{commit_file, git, head, manifest_repo, manifest_xml, upstream_repo};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a Command for the gitri binary
fn gitri_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_gitri"));
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Upstream `lib` plus a manifest repository listing it.
struct Upstreams {
    temp: TempDir,
}

impl Upstreams {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let repos = temp.path().join("repos");
        upstream_repo(&repos.join("lib"));

        let fetch = repos.to_string_lossy().replace('\\', "/");
        manifest_repo(&temp.path().join("manifests"), &manifest_xml(&fetch, &["lib"]));
        Self { temp }
    }

    fn lib(&self) -> PathBuf {
        self.temp.path().join("repos/lib")
    }

    fn manifest_url(&self) -> String {
        self.temp.path().join("manifests").to_string_lossy().to_string()
    }

    fn manifest_head(&self) -> String {
        head(&self.temp.path().join("manifests"))
    }
}

fn init_project(upstreams: &Upstreams, workspace: &Path) -> PathBuf {
    gitri_cmd()
        .args(["init", &upstreams.manifest_url(), "proj"])
        .current_dir(workspace)
        .assert()
        .success()
        .stdout(predicate::str::contains("cloned"));
    workspace.join("proj")
}

// ============================================================================
// Usage
// ============================================================================

#[test]
fn test_help_lists_commands() {
    gitri_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init").and(predicate::str::contains("sync")));
}

#[test]
fn test_version_output() {
    gitri_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gitri"));
}

#[test]
fn test_missing_command_prints_usage() {
    gitri_cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_unknown_command_is_usage_error() {
    gitri_cmd()
        .arg("frobnicate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("frobnicate"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_sync_outside_project_fails() {
    let temp = TempDir::new().unwrap();
    gitri_cmd()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not a valid gitri project"));
}

#[test]
fn test_init_into_existing_directory_fails() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("proj")).unwrap();

    gitri_cmd()
        .args(["init", "/nonexistent/manifests.git", "proj"])
        .current_dir(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Directory already exists"));
}

#[test]
fn test_init_without_default_xml_fails() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("empty-manifests");
    upstream_repo(&source);

    gitri_cmd()
        .args(["init", &source.to_string_lossy(), "proj"])
        .current_dir(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no default.xml"));
    assert!(temp.path().join("proj/.gitri/manifest").is_dir());
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_init_clones_manifest_and_repositories() {
    let upstreams = Upstreams::new();
    let workspace = TempDir::new().unwrap();

    let proj = init_project(&upstreams, workspace.path());

    assert!(proj.join(".gitri/manifest.xml").is_file());
    assert!(proj.join(".gitri/manifest/default.xml").is_file());
    assert!(proj.join("lib/README.md").is_file());

    let revset = upstreams.manifest_head();
    assert_eq!(
        git(&proj.join("lib"), &["rev-parse", "--abbrev-ref", "HEAD"]),
        format!("gitri/origin/{revset}")
    );
    assert_eq!(
        git(&proj.join("lib"), &["rev-parse", &format!("refs/bookmarks/origin/{revset}")]),
        head(&upstreams.lib())
    );
}

#[test]
fn test_init_default_directory_from_url() {
    let upstreams = Upstreams::new();
    let workspace = TempDir::new().unwrap();

    gitri_cmd()
        .args(["init", &upstreams.manifest_url()])
        .current_dir(workspace.path())
        .assert()
        .success();

    assert!(workspace.path().join("manifests/.gitri/manifest.xml").is_file());
}

#[test]
fn test_sync_fast_forwards_from_nested_directory() {
    let upstreams = Upstreams::new();
    let workspace = TempDir::new().unwrap();
    let proj = init_project(&upstreams, workspace.path());

    let tip = commit_file(&upstreams.lib(), "CHANGES.md", "v2\n");

    gitri_cmd()
        .arg("sync")
        .current_dir(proj.join("lib"))
        .assert()
        .success()
        .stdout(predicate::str::contains("fast-forwarded"));

    assert_eq!(head(&proj.join("lib")), tip);
    let revset = upstreams.manifest_head();
    assert_eq!(
        git(&proj.join("lib"), &["rev-parse", &format!("refs/bookmarks/origin/{revset}")]),
        tip
    );
}

#[test]
fn test_sync_json_report() {
    let upstreams = Upstreams::new();
    let workspace = TempDir::new().unwrap();
    let proj = init_project(&upstreams, workspace.path());

    let output = gitri_cmd()
        .args(["sync", "--json"])
        .current_dir(&proj)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["revset"], upstreams.manifest_head());
    assert_eq!(report["outcomes"][0]["name"], "lib");
    assert_eq!(report["outcomes"][0]["action"], "up_to_date");
    assert!(report["errors"].as_array().unwrap().is_empty());
}

#[test]
fn test_sync_dry_run_changes_nothing() {
    let upstreams = Upstreams::new();
    let workspace = TempDir::new().unwrap();
    let proj = init_project(&upstreams, workspace.path());
    let before = head(&proj.join("lib"));

    commit_file(&upstreams.lib(), "CHANGES.md", "v2\n");

    gitri_cmd()
        .args(["sync", "--dry-run"])
        .current_dir(&proj)
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));

    assert_eq!(head(&proj.join("lib")), before);
}

#[test]
fn test_sync_reports_changed_branch_as_skip() {
    let upstreams = Upstreams::new();
    let workspace = TempDir::new().unwrap();
    let proj = init_project(&upstreams, workspace.path());
    git(&proj.join("lib"), &["checkout", "-q", "-b", "feature"]);

    gitri_cmd()
        .arg("sync")
        .current_dir(&proj)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "lib has changed branches and cannot be safely synced; skipping",
        ));
}
