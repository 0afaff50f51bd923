//! Shared helpers for the integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub use fmf_discover::test_utils::{FmfTreeFixture, LibraryRepoFixture, TestGit};

/// Scratch space for one test: repositories, a working area and an empty
/// global config so the user's own configuration never leaks in.
pub struct TestProject {
    temp: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.toml"), "").unwrap();
        Self {
            temp,
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn workdir(&self) -> PathBuf {
        self.temp.path().join("work")
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.temp.path().join("config.toml"), content).unwrap();
    }

    /// A committed git repository at `name` holding an fmf tree built by `build`.
    pub fn repo(
        &self,
        name: &str,
        build: impl FnOnce(FmfTreeFixture) -> anyhow::Result<FmfTreeFixture>,
    ) -> PathBuf {
        let path = self.temp.path().join(name);
        let git = TestGit::new(&path);
        git.init().unwrap();
        build(FmfTreeFixture::init(&path).unwrap()).unwrap();
        git.commit_all("Add tests").unwrap();
        path
    }

    /// The binary, run from the project directory with the project config
    /// and the working area preset.
    pub fn cmd(&self, subcommand: &str) -> Command {
        let mut cmd = Command::cargo_bin("fmf-discover").unwrap();
        cmd.current_dir(self.temp.path())
            .env("FMF_DISCOVER_CONFIG", self.temp.path().join("config.toml"))
            .env_remove("RUST_LOG")
            .arg(subcommand)
            .arg("--workdir")
            .arg(self.workdir());
        cmd
    }

    /// Run `discover` with `args` and JSON output; the run must succeed.
    pub fn discover_json(&self, args: &[&str]) -> Vec<Value> {
        let output = self.cmd("discover").args(args).args(["--format", "json"]).assert().success();
        let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
        match serde_json::from_str(&stdout).unwrap() {
            Value::Array(tests) => tests,
            other => panic!("Expected a list of tests, got {other}"),
        }
    }
}

/// `(name, path)` of every test.
pub fn names_and_paths(tests: &[Value]) -> Vec<(String, String)> {
    tests
        .iter()
        .map(|t| (t["name"].as_str().unwrap().to_string(), t["path"].as_str().unwrap().to_string()))
        .collect()
}

/// The `require` list of a test.
pub fn requires(test: &Value) -> Vec<String> {
    test["require"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_str().unwrap().to_string())
        .collect()
}
