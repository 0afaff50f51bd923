use predicates::prelude::*;
use std::fs;

use crate::common::TestProject;

#[test]
fn test_local_path_not_a_directory() {
    let project = TestProject::new();
    let missing = project.path().join("nowhere");

    project
        .cmd("discover")
        .args(["--path", &missing.display().to_string()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("is not a directory"))
        .stderr(predicate::str::contains("nowhere"));
}

#[test]
fn test_missing_path_reported_in_dry_mode() {
    let project = TestProject::new();
    let missing = project.path().join("nowhere");

    project
        .cmd("discover")
        .args(["--dry", "--path", &missing.display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn test_clone_failure() {
    let project = TestProject::new();
    let url = project.path().join("no-such-repo").display().to_string();

    project
        .cmd("discover")
        .args(["--url", &url])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to clone repository"));
}

#[test]
fn test_unknown_reference() {
    let project = TestProject::new();
    let repo = project.repo("repo", |tree| tree.test("t", &[]));

    project
        .cmd("discover")
        .args(["--url", &repo.display().to_string(), "--ref", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist"));
}

#[test]
fn test_tree_path_missing_in_repository() {
    let project = TestProject::new();
    let repo = project.repo("repo", |tree| tree.test("t", &[]));

    project
        .cmd("discover")
        .args(["--url", &repo.display().to_string(), "--path", "/elsewhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Metadata tree path"));
}

#[test]
fn test_invalid_metadata() {
    let project = TestProject::new();
    let repo = project.repo("repo", |tree| tree.file("broken.fmf", "test: [unclosed\n"));

    project
        .cmd("discover")
        .args(["--url", &repo.display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.fmf"));
}

#[test]
fn test_unsupported_discover_method() {
    let project = TestProject::new();
    let plan = project.path().join("plan.yaml");
    fs::write(&plan, "discover:\n    how: shell\n").unwrap();

    project
        .cmd("show")
        .args(["--plan", &plan.display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported discover method 'shell'"));
}

#[test]
fn test_invalid_global_config() {
    let project = TestProject::new();
    project.write_config("default_ref = ''\n");

    project
        .cmd("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("'default_ref' must not be empty"));
}
