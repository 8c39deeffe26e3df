//! Settings loaded from files on disk
//!
//! Project and global files are layered, resolved and defaulted before any
//! test runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;

use settings_assert::config::{ConfigError, SettingsOrigin, PROJECT_SETTINGS_FILE};
use settings_assert::{LoaderConfig, Runner, Settings, Target, Verdict};
use settings_assert_github::MockFetcher;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_project_overrides_global_region() {
    let workspace = TempDir::new().unwrap();
    let config_dir = TempDir::new().unwrap();
    write(
        workspace.path(),
        PROJECT_SETTINGS_FILE,
        "tests:\n  wiki:\n    path: \"repos/{owner}/{repo}\"\n    json: {has_wiki: false}\n",
    );
    write(
        config_dir.path(),
        "default-repository-settings.yaml",
        r#"
visibility: public
tests:
  ignored-by-project: {path: "x", json: {}}
defaults:
  tests:
    visibility:
      path: "repos/{owner}/{repo}"
      json: {visibility: "<visibility>"}
"#,
    );

    let settings =
        Settings::load(&LoaderConfig::from_dirs(workspace.path(), config_dir.path())).unwrap();

    let names: Vec<_> = settings.tests().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["wiki", "visibility"]);

    let origins: Vec<_> = settings.sources().iter().map(|s| s.origin).collect();
    assert_eq!(origins, vec![SettingsOrigin::Project, SettingsOrigin::Global]);
    assert!(settings.sources().iter().all(|s| s.digest.len() == 64));

    let fetcher = MockFetcher::new()
        .with_json("repos/acme/widgets", json!({"has_wiki": false, "visibility": "public"}));
    let target = Target::new("acme", "widgets");
    let results = Runner::new(&fetcher, &target).run(&settings).unwrap();
    assert_eq!(results.succeeded(), 2);
}

#[test]
fn test_global_file_alone() {
    let dir = TempDir::new().unwrap();
    let global = write(
        dir.path(),
        "defaults.yaml",
        "tests:\n  visibility:\n    path: \"repos/{owner}/{repo}\"\n    hints: [\"Make it public\"]\n    json: {visibility: public}\n",
    );

    let settings = Settings::load(&LoaderConfig {
        project_path: dir.path().join("missing.yaml"),
        global_path: global,
    })
    .unwrap();

    assert_eq!(settings.tests().len(), 1);
    assert_eq!(settings.tests()[0].hints, vec!["Make it public".to_string()]);
    assert_eq!(settings.sources().len(), 1);
    assert_eq!(settings.sources()[0].origin, SettingsOrigin::Global);
}

#[test]
fn test_invalid_spec_aborts_before_running() {
    let dir = TempDir::new().unwrap();
    let project = write(
        dir.path(),
        PROJECT_SETTINGS_FILE,
        "tests:\n  fine: {path: a, json: {}}\n  broken: {path: b, ignore: true}\n",
    );

    let err = Settings::load(&LoaderConfig {
        project_path: project,
        global_path: dir.path().join("none.yaml"),
    })
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Invalid test 'broken': one of 'json' or 'array' is required"
    );
}

#[test]
fn test_non_mapping_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let project = write(dir.path(), PROJECT_SETTINGS_FILE, "- just\n- a list\n");

    let err = Settings::load(&LoaderConfig {
        project_path: project,
        global_path: dir.path().join("none.yaml"),
    })
    .unwrap_err();

    assert!(matches!(err, ConfigError::NotAMapping { .. }));
}

#[test]
fn test_ignored_test_with_fetch_stub() {
    let dir = TempDir::new().unwrap();
    let project = write(
        dir.path(),
        PROJECT_SETTINGS_FILE,
        "tests:\n  later:\n    path: \"repos/{owner}/{repo}\"\n    ignore: true\n    array: [a]\n",
    );

    let settings = Settings::load(&LoaderConfig {
        project_path: project,
        global_path: dir.path().join("none.yaml"),
    })
    .unwrap();

    let fetcher = MockFetcher::new();
    let target = Target::new("acme", "widgets");
    let results = Runner::new(&fetcher, &target).run(&settings).unwrap();
    assert_eq!(results.results()[0].verdict, Verdict::Ignored);
    assert!(fetcher.requests().is_empty());
}
