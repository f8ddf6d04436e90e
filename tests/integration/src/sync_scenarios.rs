//! Sync scenarios against real git repositories
//!
//! Each test builds upstream repositories and a manifest repository on disk,
//! initializes a project through the library API, and drives the git2
//! backend through the situations a synced tree runs into.

use gitri_core::{Project, SkipReason, SyncAction, SyncEngine, SyncOptions, SyncReport};
use gitri_test_utils::git::{
    commit_file, configure_identity, git, head, manifest_repo, manifest_xml, upstream_repo,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Scenario {
    temp: TempDir,
    project: Project,
}

impl Scenario {
    /// Upstreams for `repos`, a manifest listing them, and an initialized project.
    fn new(repos: &[&str]) -> Self {
        let temp = TempDir::new().unwrap();
        let upstreams = temp.path().join("repos");
        for repo in repos {
            upstream_repo(&upstreams.join(repo));
        }
        let fetch = upstreams.to_string_lossy().replace('\\', "/");
        let manifests = temp.path().join("manifests");
        manifest_repo(&manifests, &manifest_xml(&fetch, repos));

        let (project, report) = Project::init(
            &SyncEngine::new(),
            &manifests.to_string_lossy(),
            Some(temp.path().join("proj").as_path()),
            None,
        )
        .unwrap();
        for repo in repos {
            assert_eq!(action(&report, repo), SyncAction::Cloned);
        }

        Self { temp, project }
    }

    fn upstream(&self, repo: &str) -> PathBuf {
        self.temp.path().join("repos").join(repo)
    }

    fn checkout(&self, repo: &str) -> PathBuf {
        self.project.root().to_native().join(repo)
    }

    fn revset(&self) -> String {
        head(&self.project.manifest_repo_path().to_native())
    }

    fn bookmark(&self, repo: &str) -> String {
        git(
            &self.checkout(repo),
            &["rev-parse", &format!("refs/bookmarks/origin/{}", self.revset())],
        )
    }

    fn sync(&self) -> SyncReport {
        SyncEngine::new().sync(&self.project).unwrap()
    }
}

fn action(report: &SyncReport, repo: &str) -> SyncAction {
    report.outcome(repo).unwrap().action.clone()
}

fn branch(dir: &Path) -> String {
    git(dir, &["rev-parse", "--abbrev-ref", "HEAD"])
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn clone_then_fast_forward_then_idempotent() {
    let s = Scenario::new(&["lib"]);
    let lib = s.checkout("lib");

    assert_eq!(branch(&lib), format!("gitri/origin/{}", s.revset()));
    assert_eq!(s.bookmark("lib"), head(&s.upstream("lib")));
    assert_eq!(s.bookmark("lib"), head(&lib));

    commit_file(&s.upstream("lib"), "one.txt", "1\n");
    let tip = commit_file(&s.upstream("lib"), "two.txt", "2\n");

    let report = s.sync();
    assert_eq!(action(&report, "lib"), SyncAction::FastForwarded);
    assert_eq!(head(&lib), tip);
    assert_eq!(s.bookmark("lib"), tip);
    assert!(lib.join("two.txt").is_file());

    for _ in 0..2 {
        let report = s.sync();
        assert_eq!(action(&report, "lib"), SyncAction::UpToDate);
        assert_eq!(head(&lib), tip);
        assert_eq!(s.bookmark("lib"), tip);
    }
}

#[test]
fn local_commits_are_rebased_onto_upstream() {
    let s = Scenario::new(&["lib"]);
    let lib = s.checkout("lib");
    configure_identity(&lib);

    commit_file(&lib, "local.txt", "mine\n");
    let upstream_tip = commit_file(&s.upstream("lib"), "remote.txt", "theirs\n");

    let report = s.sync();

    assert_eq!(action(&report, "lib"), SyncAction::Rebased);
    assert_eq!(git(&lib, &["rev-parse", "HEAD~1"]), upstream_tip);
    assert_eq!(branch(&lib), format!("gitri/origin/{}", s.revset()));
    assert!(lib.join("local.txt").is_file());
    assert!(lib.join("remote.txt").is_file());
    assert_eq!(s.bookmark("lib"), head(&lib));
}

#[test]
fn dirty_tree_blocks_rebase() {
    let s = Scenario::new(&["lib"]);
    let lib = s.checkout("lib");
    configure_identity(&lib);

    let local = commit_file(&lib, "local.txt", "mine\n");
    commit_file(&s.upstream("lib"), "remote.txt", "theirs\n");
    fs::write(lib.join("README.md"), "edited but not committed\n").unwrap();

    let report = s.sync();

    assert_eq!(
        action(&report, "lib"),
        SyncAction::Skipped(SkipReason::DirtyWorkingTree)
    );
    assert_eq!(head(&lib), local);
    assert_eq!(
        fs::read_to_string(lib.join("README.md")).unwrap(),
        "edited but not committed\n"
    );
}

#[test]
fn new_manifest_revision_starts_a_new_sync_epoch() {
    let s = Scenario::new(&["lib"]);
    let old_branch = branch(&s.checkout("lib"));

    let manifest_checkout = s.project.manifest_repo_path().to_native();
    configure_identity(&manifest_checkout);
    commit_file(&manifest_checkout, "NOTES.md", "bump\n");

    let report = s.sync();

    assert_eq!(report.revset, s.revset());
    assert_eq!(
        action(&report, "lib"),
        SyncAction::Skipped(SkipReason::ChangedBranch {
            found: old_branch,
            expected: format!("gitri/origin/{}", s.revset()),
        })
    );
}

#[test]
fn keep_going_isolates_a_broken_repository() {
    let s = Scenario::new(&["lib", "app"]);
    fs::rename(s.upstream("lib"), s.temp.path().join("moved-lib")).unwrap();
    let app_tip = commit_file(&s.upstream("app"), "feature.txt", "new\n");

    let err = SyncEngine::new().sync(&s.project).unwrap_err();
    assert!(err.to_string().contains("Failed to sync lib"), "got {err}");

    let report = SyncEngine::new()
        .with_options(SyncOptions {
            keep_going: true,
            ..Default::default()
        })
        .sync(&s.project)
        .unwrap();

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].name, "lib");
    assert_eq!(action(&report, "app"), SyncAction::FastForwarded);
    assert_eq!(head(&s.checkout("app")), app_tip);
}
