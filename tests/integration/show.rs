use predicates::prelude::*;
use std::fs;

use crate::common::TestProject;

#[test]
fn test_show_options() {
    let project = TestProject::new();

    project
        .cmd("show")
        .args(["--url", "https://github.com/teemtee/tmt", "-r", "main", "-t", "^/core", "-t", "basic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("   how: fmf"))
        .stdout(predicate::str::contains("   url: https://github.com/teemtee/tmt"))
        .stdout(predicate::str::contains("   ref: main"))
        .stdout(predicate::str::contains("  test: ^/core, basic"));

    assert!(!project.workdir().exists());
}

#[test]
fn test_show_plan() {
    let project = TestProject::new();
    let plan = project.path().join("plan.yaml");
    fs::write(&plan, "how: fmf\npath: /tests/full\nfilter:\n  - 'tier: 1'\n  - 'component: httpd'\n")
        .unwrap();

    project
        .cmd("show")
        .args(["--plan", &plan.display().to_string()])
        .assert()
        .success()
        .stdout("   how: fmf\n  path: /tests/full\nfilter: tier: 1, component: httpd\n");
}
