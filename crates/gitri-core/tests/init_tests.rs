//! Tests for project initialization against the in-memory backend

use gitri_core::{Error, Project, SyncAction, SyncEngine};
use gitri_fs::NormalizedPath;
use gitri_test_utils::FakeBackend;
use gitri_test_utils::project::SINGLE_REPO_MANIFEST;
use std::fs;
use tempfile::TempDir;

const MANIFEST_URL: &str = "https://example/manifests.git";
const LIB_URL: &str = "https://example/repos/lib";

fn backend_with_manifest() -> FakeBackend {
    let fake = FakeBackend::new();
    fake.add_upstream(MANIFEST_URL, "main");
    fake.add_upstream_file(MANIFEST_URL, "default.xml", SINGLE_REPO_MANIFEST);
    fake.add_upstream(LIB_URL, "main");
    fake
}

#[test]
fn test_init_bootstraps_and_syncs() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("proj");
    let fake = backend_with_manifest();
    let engine = SyncEngine::with_backend(Box::new(fake.clone()));

    let (project, report) = Project::init(&engine, MANIFEST_URL, Some(dest.as_path()), None).unwrap();

    assert_eq!(
        fs::read_to_string(dest.join(".gitri/manifest.xml")).unwrap(),
        SINGLE_REPO_MANIFEST
    );
    assert_eq!(report.revset, fake.head(&project.manifest_repo_path()));
    assert_eq!(report.outcome("lib").unwrap().action, SyncAction::Cloned);
    assert_eq!(
        fake.branch(&project.manifest_repo_path()),
        "main",
        "manifest repository stays on its default branch"
    );
}

#[test]
fn test_init_at_revset_checks_out_that_revision() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("proj");
    let fake = backend_with_manifest();
    let tagged = fake.push_upstream(MANIFEST_URL, "main");
    fake.tag_upstream(MANIFEST_URL, "v1", &tagged);
    fake.push_upstream(MANIFEST_URL, "main");
    let engine = SyncEngine::with_backend(Box::new(fake.clone()));

    let (project, report) = Project::init(&engine, MANIFEST_URL, Some(dest.as_path()), Some("v1")).unwrap();

    assert_eq!(report.revset, tagged);
    assert_eq!(fake.branch(&project.manifest_repo_path()), "HEAD");
    let lib = project.repo_path(&project.repos()[0]);
    assert_eq!(fake.branch(&lib), format!("gitri/origin/{tagged}"));
}

#[test]
fn test_init_refuses_existing_directory() {
    let temp = TempDir::new().unwrap();
    let fake = backend_with_manifest();
    let engine = SyncEngine::with_backend(Box::new(fake.clone()));

    let err = Project::init(&engine, MANIFEST_URL, Some(temp.path()), None).unwrap_err();

    assert!(matches!(err, Error::ProjectAlreadyExists { .. }));
    assert!(fake.ops().is_empty());
}

#[test]
fn test_init_requires_default_xml() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("proj");
    let fake = FakeBackend::new();
    fake.add_upstream(MANIFEST_URL, "main");
    let engine = SyncEngine::with_backend(Box::new(fake.clone()));

    let err = Project::init(&engine, MANIFEST_URL, Some(dest.as_path()), None).unwrap_err();

    assert!(matches!(err, Error::InvalidManifestRepo { .. }));
    assert!(dest.join(".gitri/manifest").is_dir());
    assert!(!dest.join(".gitri/manifest.xml").exists());
}

#[test]
fn test_init_unknown_manifest_url_fails() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("proj");
    let engine = SyncEngine::with_backend(Box::new(FakeBackend::new()));

    let err = Project::init(&engine, "https://example/missing.git", Some(dest.as_path()), None).unwrap_err();
    assert!(matches!(err, Error::Git(gitri_git::Error::RemoteNotFound { .. })));
    assert!(!NormalizedPath::new(dest.join(".gitri/manifest.xml")).exists());
}
