//! Fixtures for fmf metadata trees and beakerlib library repositories.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::git_helper::TestGit;

/// Builder for an fmf metadata tree on disk.
pub struct FmfTreeFixture {
    root: PathBuf,
}

impl FmfTreeFixture {
    /// Create `root/.fmf/version`, making `root` an fmf tree root.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(".fmf"))
            .with_context(|| format!("Failed to create {}", root.display()))?;
        fs::write(root.join(".fmf/version"), "1\n")?;
        Ok(Self {
            root,
        })
    }

    /// Write an fmf file at `relative` (e.g. `tests/basic/main.fmf`).
    pub fn file(self, relative: &str, content: &str) -> Result<Self> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(self)
    }

    /// Write `<dir>/main.fmf` declaring a test with the given requirements.
    pub fn test(self, dir: &str, requires: &[&str]) -> Result<Self> {
        let mut content = String::from("summary: fixture test\ntest: ./test.sh\n");
        if !requires.is_empty() {
            push_requires(&mut content, requires);
        }
        let relative = if dir.is_empty() {
            "main.fmf".to_string()
        } else {
            format!("{dir}/main.fmf")
        };
        self.file(&relative, &content)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// A git repository shaped like a beakerlib library component.
pub struct LibraryRepoFixture {
    git: TestGit,
}

impl LibraryRepoFixture {
    /// Create a component repository at `dir` with one committed library
    /// node per `(name, requires)` pair.
    pub fn create(dir: impl Into<PathBuf>, libraries: &[(&str, &[&str])]) -> Result<Self> {
        let dir = dir.into();
        let git = TestGit::new(&dir);
        git.init()?;

        let mut tree = FmfTreeFixture::init(&dir)?;
        for (name, requires) in libraries {
            let mut content = String::from("summary: fixture library\n");
            if !requires.is_empty() {
                push_requires(&mut content, requires);
            }
            tree = tree.file(&format!("{name}/main.fmf"), &content)?;
        }
        git.commit_all("Add libraries")?;

        Ok(Self {
            git,
        })
    }

    /// URL usable in a long-form `library{url: ...}` reference.
    pub fn url(&self) -> String {
        self.git.repo_path().display().to_string()
    }

    pub fn git(&self) -> &TestGit {
        &self.git
    }
}

/// Append a `require` list of single-quoted YAML strings.
fn push_requires(content: &mut String, requires: &[&str]) {
    content.push_str("require:\n");
    for require in requires {
        content.push_str(&format!("  - '{}'\n", require.replace('\'', "''")));
    }
}
