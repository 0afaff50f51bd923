//! File system helpers for materializing test trees.
//!
//! Directory creation, recursive copying, tree-root discovery and relative
//! path computation. All functions are synchronous; callers on the async
//! side run them inline since discovery is a single sequential flow.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::constants::FMF_ROOT_MARKER;

/// Create a directory and all of its parents if missing.
///
/// Fails if the path exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Recursively copy a directory tree, including hidden entries such as `.git`.
///
/// Symbolic links are recreated as links on Unix and skipped elsewhere. When
/// `dst` lies inside `src`, the subtree holding `dst` is not copied.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    ensure_dir(dst)?;
    let dst_canonical = dst.canonicalize().unwrap_or_else(|_| dst.to_path_buf());

    let walker = WalkDir::new(src).min_depth(1).follow_links(false).into_iter().filter_entry(|entry| {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let path = entry.path().canonicalize().unwrap_or_else(|_| entry.path().to_path_buf());
        !dst_canonical.starts_with(path)
    });

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to read directory: {}", src.display()))?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            ensure_dir(&target)?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &target).with_context(|| {
                format!("Failed to copy file from {} to {}", entry.path().display(), target.display())
            })?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let target = fs::read_link(src)
        .with_context(|| format!("Failed to read symlink: {}", src.display()))?;
    std::os::unix::fs::symlink(&target, dst)
        .with_context(|| format!("Failed to create symlink: {}", dst.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, _dst: &Path) -> Result<()> {
    tracing::debug!("Skipping symlink {}", src.display());
    Ok(())
}

/// Remove a directory tree if it exists.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Find the nearest fmf tree root at or above `start`.
///
/// A tree root is a directory containing a `.fmf` subdirectory.
pub fn find_tree_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());

    loop {
        if current.join(FMF_ROOT_MARKER).is_dir() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Compute `path` relative to `base`, both expected to be absolute.
///
/// Returns `.` when the paths are equal and uses `..` components when
/// `path` lies outside `base`.
#[must_use]
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix(base) {
        return if stripped.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            stripped.to_path_buf()
        };
    }

    let path_components: Vec<Component<'_>> = path.components().collect();
    let base_components: Vec<Component<'_>> = base.components().collect();
    let common = path_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..base_components.len() {
        result.push("..");
    }
    for component in &path_components[common..] {
        result.push(component.as_os_str());
    }
    result
}
