//! Git operations wrapper for fmf-discover
//!
//! A thin async wrapper around the system `git` command. Using the installed
//! binary instead of an embedded implementation means SSH agents, credential
//! helpers and the user's git configuration all apply to test and library
//! repositories without extra work.
//!
//! Discovery needs exactly three version-control operations:
//! - [`GitRepo::clone`] to materialize a remote test tree or a library
//! - [`GitRepo::checkout`] / [`GitRepo::checkout_forced`] to select a revision
//! - [`GitRepo::toplevel`] to find the repository root containing a local path
//!
//! Every call blocks the discovery flow until git exits; a non-zero exit is
//! surfaced as a [`DiscoverError`] and never retried.
//!
//! # Examples
//!
//! ```rust,no_run
//! use fmf_discover::git::GitRepo;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let repo = GitRepo::clone("https://github.com/teemtee/tmt", "/tmp/work/tests").await?;
//! repo.checkout_forced("main").await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`DiscoverError`]: crate::core::DiscoverError

pub mod command_builder;

use crate::core::DiscoverError;
use crate::git::command_builder::GitCommand;
use crate::utils::platform::{get_git_command, safe_canonicalize};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// A handle to a local git working tree.
///
/// Holds only the path; all state is queried from git on demand.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Create a handle for an existing working tree. The path is not validated.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Clone `url` into `target`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoverError::GitCloneFailed`] if git exits with an error,
    /// for example when the URL is unreachable or `target` is a non-empty
    /// directory.
    pub async fn clone(url: &str, target: impl AsRef<Path>) -> Result<Self> {
        let target_path = target.as_ref();

        GitCommand::clone(url, target_path).with_context("clone").execute_success().await?;

        Ok(Self::new(target_path))
    }

    /// Check out `ref_name` (branch, tag or commit).
    ///
    /// # Errors
    ///
    /// Returns [`DiscoverError::GitCheckoutFailed`] if the reference does not
    /// exist or local changes would be overwritten.
    pub async fn checkout(&self, ref_name: &str) -> Result<()> {
        GitCommand::checkout(ref_name).current_dir(&self.path).execute_success().await
    }

    /// Check out `ref_name`, discarding local modifications of tracked files.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoverError::GitCheckoutFailed`] if the reference does not exist.
    pub async fn checkout_forced(&self, ref_name: &str) -> Result<()> {
        GitCommand::checkout_forced(ref_name).current_dir(&self.path).execute_success().await
    }

    /// Root of the git working tree containing `path`, if any.
    ///
    /// Any failure (not a repository, git missing, unreadable directory) is
    /// reported as `None`; callers fall back to using `path` itself.
    pub async fn toplevel(path: &Path) -> Option<PathBuf> {
        match GitCommand::show_toplevel().current_dir(path).execute_stdout().await {
            Ok(root) if !root.is_empty() => {
                let root = PathBuf::from(root);
                Some(safe_canonicalize(&root).unwrap_or(root))
            }
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(target: "git", "No git root for {}: {}", path.display(), e);
                None
            }
        }
    }

    /// The working tree path this handle points at.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Returns true if a working `git` executable is on PATH.
#[must_use]
pub fn is_git_installed() -> bool {
    std::process::Command::new(get_git_command())
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Fail with [`DiscoverError::GitNotFound`] unless git is available.
pub fn ensure_git_available() -> Result<()> {
    if !is_git_installed() {
        return Err(DiscoverError::GitNotFound.into());
    }
    Ok(())
}
