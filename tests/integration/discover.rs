use predicates::prelude::*;
use std::fs;

use crate::common::{FmfTreeFixture, TestGit, TestProject, names_and_paths, requires};

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
}

#[test]
fn test_local_subdirectory_paths_under_tests() {
    let project = TestProject::new();
    let repo = project.path().join("repo");
    let git = TestGit::new(&repo);
    git.init().unwrap();
    fs::write(repo.join("README"), "tests live in sub/\n").unwrap();
    FmfTreeFixture::init(repo.join("sub"))
        .unwrap()
        .test("a", &["bash"])
        .unwrap()
        .test("b", &[])
        .unwrap();
    git.commit_all("Add tests").unwrap();

    let path = repo.join("sub").display().to_string();
    let tests = project.discover_json(&["--path", &path]);

    assert_eq!(names_and_paths(&tests), pairs(&[("/a", "/tests/sub/a"), ("/b", "/tests/sub/b")]));
    assert_eq!(requires(&tests[0]), vec!["bash"]);
    assert!(project.workdir().join("tests/README").is_file());
}

#[test]
fn test_project_root_from_current_directory() {
    let project = TestProject::new();
    let repo = project.repo("repo", |tree| tree.test("smoke", &[]));

    let output = project
        .cmd("discover")
        .current_dir(repo.join("smoke"))
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("name: /smoke"));
    assert!(stdout.contains("path: /tests/smoke"));
}

#[test]
fn test_url_with_ref_and_path() {
    let project = TestProject::new();
    let repo = project.path().join("remote");
    let git = TestGit::new(&repo);
    git.init().unwrap();
    FmfTreeFixture::init(repo.join("plans")).unwrap().test("first", &[]).unwrap();
    git.commit_all("First").unwrap();
    git.tag("v1").unwrap();
    FmfTreeFixture::init(repo.join("plans")).unwrap().test("second", &[]).unwrap();
    git.commit_all("Second").unwrap();

    let url = repo.display().to_string();
    let tests = project.discover_json(&["--url", &url, "--ref", "v1", "--path", "/plans"]);
    assert_eq!(names_and_paths(&tests), pairs(&[("/first", "/tests/plans/first")]));

    let tests = project.discover_json(&["--url", &url, "--path", "plans"]);
    assert_eq!(tests.len(), 2);
}

#[test]
fn test_explicit_path_attribute_is_kept_under_prefix() {
    let project = TestProject::new();
    let repo = project.repo("repo", |tree| {
        tree.file("moved.fmf", "test: ./run.sh\npath: /shared/scripts\n")
    });

    let url = repo.display().to_string();
    let tests = project.discover_json(&["--url", &url]);
    assert_eq!(names_and_paths(&tests), pairs(&[("/moved", "/tests/shared/scripts")]));
}

#[test]
fn test_selection_by_filter_and_name() {
    let project = TestProject::new();
    let repo = project.repo("repo", |tree| {
        tree.file("basic/main.fmf", "test: ./basic.sh\ntier: 1\n")?
            .file("full/main.fmf", "test: ./full.sh\ntier: 2\n")?
            .file("extra/main.fmf", "test: ./extra.sh\ntier: 1\ntag: [slow]\n")
    });
    let url = repo.display().to_string();

    let tests = project.discover_json(&["--url", &url, "--filter", "tier: 1"]);
    assert_eq!(
        names_and_paths(&tests),
        pairs(&[("/basic", "/tests/basic"), ("/extra", "/tests/extra")])
    );

    let tests = project.discover_json(&["--url", &url, "-F", "tier: 1", "-F", "tag: -slow"]);
    assert_eq!(names_and_paths(&tests), pairs(&[("/basic", "/tests/basic")]));

    let tests = project.discover_json(&["--url", &url, "--test", "^/full", "--test", "extra"]);
    assert_eq!(
        names_and_paths(&tests),
        pairs(&[("/extra", "/tests/extra"), ("/full", "/tests/full")])
    );
}

#[test]
fn test_plan_file_with_overrides() {
    let project = TestProject::new();
    let repo = project.repo("repo", |tree| {
        tree.file("one/main.fmf", "test: ./one.sh\ntier: 1\n")?
            .file("two/main.fmf", "test: ./two.sh\ntier: 2\n")
    });
    let plan = project.path().join("plan.yaml");
    fs::write(
        &plan,
        format!("discover:\n    how: fmf\n    repository: '{}'\n    filter: 'tier: 1'\n", repo.display()),
    )
    .unwrap();
    let plan = plan.display().to_string();

    let tests = project.discover_json(&["--plan", &plan]);
    assert_eq!(names_and_paths(&tests), pairs(&[("/one", "/tests/one")]));

    let tests = project.discover_json(&["--plan", &plan, "--filter", "tier: 2"]);
    assert_eq!(names_and_paths(&tests), pairs(&[("/two", "/tests/two")]));
}

#[test]
fn test_dry_run_discovers_nothing() {
    let project = TestProject::new();
    let repo = project.repo("repo", |tree| tree.test("smoke", &[]));
    let url = repo.display().to_string();

    project
        .cmd("discover")
        .args(["--url", &url, "--dry"])
        .assert()
        .success()
        .stdout("[]\n")
        .stderr(predicate::str::contains(format!("url: {url}")));

    assert!(!project.workdir().join("tests").exists());
}

#[test]
fn test_rerun_replaces_previous_tree() {
    let project = TestProject::new();
    let first = project.repo("first", |tree| tree.test("old", &[]));
    let second = project.repo("second", |tree| tree.test("new", &[]));

    project.discover_json(&["--url", &first.display().to_string()]);
    let tests = project.discover_json(&["--url", &second.display().to_string()]);

    assert_eq!(names_and_paths(&tests), pairs(&[("/new", "/tests/new")]));
    assert!(!project.workdir().join("tests/old").exists());
}

#[test]
fn test_path_below_tree_root_selects_subtree() {
    let project = TestProject::new();
    let repo = project.repo("repo", |tree| tree.test("other/outside", &[])?.test("sub/basic", &[]));

    let tests = project.discover_json(&["--path", &repo.join("sub").display().to_string()]);
    assert_eq!(names_and_paths(&tests), pairs(&[("/basic", "/tests/sub/basic")]));
}

#[test]
fn test_foreign_tests_directory_is_kept() {
    let project = TestProject::new();
    let repo = project.repo("repo", |tree| tree.test("smoke", &[]));
    let own = project.workdir().join("tests/mine.txt");
    fs::create_dir_all(own.parent().unwrap()).unwrap();
    fs::write(&own, "not from fmf-discover\n").unwrap();

    project
        .cmd("discover")
        .args(["--url", &repo.display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert!(own.is_file());
}
