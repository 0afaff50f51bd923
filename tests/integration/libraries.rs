use predicates::prelude::*;

use crate::common::{LibraryRepoFixture, TestProject, requires};

#[test]
fn test_long_form_library_expanded_in_place() {
    let project = TestProject::new();
    let library =
        LibraryRepoFixture::create(project.path().join("web"), &[("main", &["httpd", "curl"])])
            .unwrap();
    let reference = format!("library{{url: '{}'}}", library.url());
    let repo = project.repo("repo", |tree| {
        tree.test("a", &["bash", reference.as_str(), "jq"])?.test("b", &[reference.as_str()])
    });

    let tests = project.discover_json(&["--url", &repo.display().to_string()]);
    assert_eq!(requires(&tests[0]), vec!["bash", "httpd", "curl", "jq"]);
    assert_eq!(requires(&tests[1]), vec!["httpd", "curl"]);
    assert!(project.workdir().join("libs/web/main/main.fmf").is_file());
}

#[test]
fn test_short_form_uses_configured_host() {
    let project = TestProject::new();
    let host = project.path().join("libraries");
    LibraryRepoFixture::create(host.join("openssl"), &[("certgen", &["openssl", "expect"])])
        .unwrap();
    project.write_config(&format!("library_host = '{}'\n", host.display()));
    let repo = project.repo("repo", |tree| tree.test("tls", &["library(openssl/certgen)"]));

    let tests = project.discover_json(&["--url", &repo.display().to_string()]);
    assert_eq!(requires(&tests[0]), vec!["openssl", "expect"]);
}

#[test]
fn test_nested_libraries_and_duplicates() {
    let project = TestProject::new();
    let base = LibraryRepoFixture::create(project.path().join("base"), &[("main", &["coreutils"])])
        .unwrap();
    let base_ref = format!("library{{url: '{}'}}", base.url());
    let web = LibraryRepoFixture::create(
        project.path().join("web"),
        &[("main", &[base_ref.as_str(), "httpd"])],
    )
    .unwrap();
    let web_ref = format!("library{{url: '{}'}}", web.url());
    let repo = project.repo("repo", |tree| {
        tree.test("t", &[web_ref.as_str(), base_ref.as_str(), "coreutils"])
    });

    let tests = project.discover_json(&["--url", &repo.display().to_string()]);
    assert_eq!(requires(&tests[0]), vec!["coreutils", "httpd", "coreutils", "coreutils"]);
}

#[test]
fn test_circular_libraries_fail() {
    let project = TestProject::new();
    let url = project.path().join("loop").display().to_string();
    let a = format!("library{{url: '{url}', name: /a}}");
    let b = format!("library{{url: '{url}', name: /b}}");
    LibraryRepoFixture::create(project.path().join("loop"), &[("a", &[b.as_str()]), ("b", &[a.as_str()])])
        .unwrap();
    let repo = project.repo("repo", |tree| tree.test("t", &[a.as_str()]));

    project
        .cmd("discover")
        .args(["--url", &repo.display().to_string()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("loop/a -> loop/b -> loop/a"));
}

#[test]
fn test_missing_library_node_fails() {
    let project = TestProject::new();
    let library =
        LibraryRepoFixture::create(project.path().join("web"), &[("main", &["httpd"])]).unwrap();
    let reference = format!("library{{url: '{}', name: /absent}}", library.url());
    let repo = project.repo("repo", |tree| tree.test("t", &[reference.as_str()]));

    project
        .cmd("discover")
        .args(["--url", &repo.display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Library '/absent' not found in component 'web'"));
}

#[test]
fn test_malformed_short_form_fails() {
    let project = TestProject::new();
    let repo = project.repo("repo", |tree| tree.test("t", &["library(a/b/c)"]));

    project
        .cmd("discover")
        .args(["--url", &repo.display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed library identifier 'library(a/b/c)'"));
    assert!(!project.workdir().join("libs").exists());
}
