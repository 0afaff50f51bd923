//! Test tree resolution.
//!
//! Materializes the test source in the working area's `tests/` directory and
//! queries its metadata tree:
//!
//! - **url**: the repository is cloned into `tests/`, `path` is taken as-is
//! - **path**: the git root containing the local directory is copied into
//!   `tests/` and `path` becomes the directory's offset inside that root
//! - **neither**: like `path`, using the project root
//!
//! A requested revision is then checked out in `tests/`. Only the subtree at
//! `tests/<path>` is queried, and every test path is finally nested under
//! `/tests/<path>`, the location the tree has at run time.
//!
//! An existing `tests/` is replaced only when the working area's marker file
//! shows an earlier run created it.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::TestRecord;
use crate::constants::TESTS_PREFIX;
use crate::core::DiscoverError;
use crate::fmf::Tree;
use crate::git::GitRepo;
use crate::utils::fs::{copy_dir, ensure_dir, relative_path, remove_dir_all};
use crate::utils::platform::{normalize_path_separator, safe_canonicalize};
use crate::workdir::WorkArea;

/// Where the tests come from.
#[derive(Debug, Clone, Default)]
pub struct TestSource {
    pub url: Option<String>,
    pub path: Option<String>,
    /// Revision to check out after the tree is in place.
    pub reference: Option<String>,
}

/// Resolves a [`TestSource`] into test records.
pub struct TestTreeResolver<'a> {
    work: &'a WorkArea,
    project_root: &'a Path,
    dry: bool,
}

impl<'a> TestTreeResolver<'a> {
    /// `project_root` is used when the source names neither url nor path.
    pub fn new(work: &'a WorkArea, project_root: &'a Path) -> Self {
        Self {
            work,
            project_root,
            dry: false,
        }
    }

    /// In dry mode nothing is cloned, copied or checked out and no tests
    /// are returned.
    pub fn dry(mut self, dry: bool) -> Self {
        self.dry = dry;
        self
    }

    /// Materialize the tree and return the tests selected by `filters` and
    /// `names`, with paths rewritten to their run-time location.
    ///
    /// # Errors
    ///
    /// - [`DiscoverError::WorkAreaOccupied`] if `tests/` exists without the marker
    /// - [`DiscoverError::PathNotFound`] if a local path is not a directory
    /// - [`DiscoverError::GitCloneFailed`] / [`DiscoverError::GitCheckoutFailed`]
    /// - [`DiscoverError::MetadataTreeNotFound`] if `tests/<path>` is missing
    pub async fn resolve(
        &self,
        source: &TestSource,
        filters: &[String],
        names: &[String],
    ) -> Result<Vec<TestRecord>> {
        let tests_dir = self.work.tests_dir();
        if !self.dry {
            self.claim_tests_dir(&tests_dir)?;
        }

        let path = match &source.url {
            Some(url) => {
                tracing::info!("url: {url}");
                if !self.dry {
                    GitRepo::clone(url, &tests_dir).await?;
                }
                source.path.clone()
            }
            None => Some(self.copy_local(source.path.as_deref(), &tests_dir).await?),
        };

        if let Some(reference) = &source.reference {
            tracing::info!("ref: {reference}");
            if !self.dry {
                GitRepo::new(&tests_dir).checkout_forced(reference).await?;
            }
        }

        let path = normalize_tree_path(path.as_deref());
        let tree_path = tests_dir.join(&path);
        if !self.dry && !tree_path.is_dir() {
            return Err(DiscoverError::MetadataTreeNotFound {
                path: tree_path.display().to_string(),
            }
            .into());
        }
        let prefix = join_runtime(TESTS_PREFIX, &path);
        tracing::debug!("Tree path '{}', test prefix '{}'", tree_path.display(), prefix);

        if !filters.is_empty() {
            tracing::info!("filters: {}", filters.join(", "));
        }
        if !names.is_empty() {
            tracing::info!("names: {}", names.join(", "));
        }

        if self.dry {
            return Ok(Vec::new());
        }

        let tree = Tree::load(&tree_path)?;
        let tests = tree.tests(filters, names)?;
        tracing::info!("tests: {} found", tests.len());

        Ok(tests
            .into_iter()
            .map(|node| {
                let mut record = TestRecord::from_node(node);
                record.path = join_runtime(&prefix, &record.path);
                record
            })
            .collect())
    }

    /// Clear a `tests/` left by an earlier run and mark the directory as ours.
    fn claim_tests_dir(&self, tests_dir: &Path) -> Result<()> {
        let marker = self.work.tests_marker();
        if tests_dir.exists() {
            if !marker.is_file() {
                return Err(DiscoverError::WorkAreaOccupied {
                    path: tests_dir.display().to_string(),
                }
                .into());
            }
            tracing::debug!("Removing previous test tree '{}'", tests_dir.display());
            remove_dir_all(tests_dir)?;
        }
        ensure_dir(self.work.root())?;
        std::fs::write(&marker, "")
            .with_context(|| format!("Failed to write {}", marker.display()))?;
        Ok(())
    }

    /// Copy the git root containing the local directory into `tests_dir`
    /// and return the directory's offset inside it.
    async fn copy_local(&self, path: Option<&str>, tests_dir: &Path) -> Result<String> {
        let directory = match path {
            Some(path) => PathBuf::from(path),
            None => self.project_root.to_path_buf(),
        };
        if !directory.is_dir() {
            return Err(DiscoverError::PathNotFound {
                path: directory.display().to_string(),
            }
            .into());
        }
        let directory = safe_canonicalize(&directory)?;
        tracing::info!("directory: {}", directory.display());

        let git_root = match GitRepo::toplevel(&directory).await {
            Some(root) => root,
            None => {
                tracing::debug!("{} is not in a git repository", directory.display());
                directory.clone()
            }
        };

        if !self.dry {
            tracing::debug!("Copy '{}' to '{}'", git_root.display(), tests_dir.display());
            copy_dir(&git_root, tests_dir)?;
        }

        Ok(normalize_path_separator(&relative_path(&directory, &git_root)))
    }
}

/// `None`, empty and `.` all mean the tree root; leading slashes are dropped.
fn normalize_tree_path(path: Option<&str>) -> String {
    match path.map(|p| p.trim_matches('/')) {
        None | Some("" | ".") => String::new(),
        Some(path) => path.to_string(),
    }
}

/// Join run-time paths with `/`, ignoring empty parts.
fn join_runtime(base: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FmfTreeFixture, TestGit};
    use std::fs;
    use tempfile::TempDir;

    fn names(records: &[TestRecord]) -> Vec<(&str, &str)> {
        records.iter().map(|r| (r.name.as_str(), r.path.as_str())).collect()
    }

    #[test]
    fn test_normalize_tree_path() {
        assert_eq!(normalize_tree_path(None), "");
        assert_eq!(normalize_tree_path(Some(".")), "");
        assert_eq!(normalize_tree_path(Some("/")), "");
        assert_eq!(normalize_tree_path(Some("/sub/dir")), "sub/dir");
    }

    #[test]
    fn test_join_runtime() {
        assert_eq!(join_runtime("/tests", ""), "/tests");
        assert_eq!(join_runtime("/tests", "sub"), "/tests/sub");
        assert_eq!(join_runtime("/tests/sub", "/basic"), "/tests/sub/basic");
        assert_eq!(join_runtime("/tests/sub", "/"), "/tests/sub");
    }

    #[tokio::test]
    async fn test_local_path_inside_git_root() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        let git = TestGit::new(&repo);
        git.init().unwrap();
        FmfTreeFixture::init(repo.join("sub")).unwrap().test("basic", &[]).unwrap();
        git.commit_all("Add tests").unwrap();

        let work = WorkArea::new(temp.path().join("work"));
        let resolver = TestTreeResolver::new(&work, temp.path());
        let source = TestSource {
            path: Some(repo.join("sub").display().to_string()),
            ..TestSource::default()
        };

        let records = resolver.resolve(&source, &[], &[]).await.unwrap();
        assert_eq!(names(&records), vec![("/basic", "/tests/sub/basic")]);
        // The whole repository is copied, not just the subdirectory
        assert!(work.tests_dir().join(".git").is_dir());
        assert!(work.tests_dir().join("sub/basic/main.fmf").is_file());
    }

    #[tokio::test]
    async fn test_local_path_below_tree_root() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        let git = TestGit::new(&repo);
        git.init().unwrap();
        FmfTreeFixture::init(&repo)
            .unwrap()
            .test("other/outside", &[])
            .unwrap()
            .test("sub/basic", &[])
            .unwrap();
        git.commit_all("Add tests").unwrap();

        let work = WorkArea::new(temp.path().join("work"));
        let resolver = TestTreeResolver::new(&work, temp.path());
        let source = TestSource {
            path: Some(repo.join("sub").display().to_string()),
            ..TestSource::default()
        };

        let records = resolver.resolve(&source, &[], &[]).await.unwrap();
        assert_eq!(names(&records), vec![("/basic", "/tests/sub/basic")]);
    }

    #[tokio::test]
    async fn test_existing_tests_dir_left_untouched() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        let git = TestGit::new(&repo);
        git.init().unwrap();
        FmfTreeFixture::init(&repo).unwrap().test("tests/basic", &[]).unwrap();
        git.commit_all("Add tests").unwrap();

        // The project itself used as the working area
        let work = WorkArea::new(&repo);
        let resolver = TestTreeResolver::new(&work, &repo);

        let error = resolver.resolve(&TestSource::default(), &[], &[]).await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DiscoverError>(),
            Some(DiscoverError::WorkAreaOccupied { .. })
        ));
        assert!(repo.join("tests/basic/main.fmf").is_file());
        assert!(!work.tests_marker().exists());
    }

    #[tokio::test]
    async fn test_marked_tests_dir_is_replaced() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        FmfTreeFixture::init(&project).unwrap().test("smoke", &[]).unwrap();
        if GitRepo::toplevel(&project).await.is_some() {
            return;
        }

        let work = WorkArea::new(temp.path().join("work"));
        let resolver = TestTreeResolver::new(&work, &project);
        resolver.resolve(&TestSource::default(), &[], &[]).await.unwrap();
        assert!(work.tests_marker().is_file());

        fs::write(work.tests_dir().join("stale.txt"), "old run").unwrap();
        resolver.resolve(&TestSource::default(), &[], &[]).await.unwrap();
        assert!(!work.tests_dir().join("stale.txt").exists());
        assert!(work.tests_dir().join("smoke/main.fmf").is_file());
    }

    #[tokio::test]
    async fn test_project_root_without_git() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        FmfTreeFixture::init(&project)
            .unwrap()
            .test("smoke", &["bash"])
            .unwrap()
            .file("full/main.fmf", "test: ./full.sh\ntier: 2\n")
            .unwrap();

        // Only meaningful when the temp dir is not itself inside a git checkout
        if GitRepo::toplevel(&project).await.is_some() {
            return;
        }

        let work = WorkArea::new(temp.path().join("work"));
        let resolver = TestTreeResolver::new(&work, &project);
        let filters = vec!["tier: 2".to_string()];

        let records = resolver.resolve(&TestSource::default(), &filters, &[]).await.unwrap();
        assert_eq!(names(&records), vec![("/full", "/tests/full")]);
    }

    #[tokio::test]
    async fn test_local_path_must_be_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plan.fmf");
        fs::write(&file, "summary: x\n").unwrap();

        let work = WorkArea::new(temp.path().join("work"));
        let resolver = TestTreeResolver::new(&work, temp.path());
        let source = TestSource {
            path: Some(file.display().to_string()),
            ..TestSource::default()
        };

        let error = resolver.resolve(&source, &[], &[]).await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DiscoverError>(),
            Some(DiscoverError::PathNotFound { .. })
        ));
        assert!(!work.tests_dir().exists());
    }

    #[tokio::test]
    async fn test_url_with_reference() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("remote");
        let git = TestGit::new(&repo);
        git.init().unwrap();
        FmfTreeFixture::init(&repo).unwrap().test("old", &[]).unwrap();
        git.commit_all("Old test").unwrap();
        git.tag("v1").unwrap();
        fs::remove_dir_all(repo.join("old")).unwrap();
        FmfTreeFixture::init(&repo).unwrap().test("new", &[]).unwrap();
        git.commit_all("Replace test").unwrap();

        let work = WorkArea::new(temp.path().join("work"));
        let resolver = TestTreeResolver::new(&work, temp.path());
        let source = TestSource {
            url: Some(repo.display().to_string()),
            path: None,
            reference: Some("v1".to_string()),
        };

        let records = resolver.resolve(&source, &[], &[]).await.unwrap();
        assert_eq!(names(&records), vec![("/old", "/tests/old")]);
    }

    #[tokio::test]
    async fn test_missing_tree_path() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("remote");
        let git = TestGit::new(&repo);
        git.init().unwrap();
        FmfTreeFixture::init(&repo).unwrap().test("t", &[]).unwrap();
        git.commit_all("Test").unwrap();

        let work = WorkArea::new(temp.path().join("work"));
        let resolver = TestTreeResolver::new(&work, temp.path());
        let source = TestSource {
            url: Some(repo.display().to_string()),
            path: Some("/does/not/exist".to_string()),
            reference: None,
        };

        let error = resolver.resolve(&source, &[], &[]).await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DiscoverError>(),
            Some(DiscoverError::MetadataTreeNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_dry_mode_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let work = WorkArea::new(temp.path().join("work"));
        let resolver = TestTreeResolver::new(&work, temp.path()).dry(true);
        let source = TestSource {
            url: Some(temp.path().join("unreachable").display().to_string()),
            path: Some("sub".to_string()),
            reference: Some("v1".to_string()),
        };

        let records = resolver.resolve(&source, &[], &[]).await.unwrap();
        assert!(records.is_empty());
        assert!(!work.tests_dir().exists());
    }
}
