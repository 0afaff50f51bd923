//! Platform-specific helpers.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Returns true when compiled for Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Name of the git executable for the current platform.
#[must_use]
pub const fn get_git_command() -> &'static str {
    if is_windows() {
        "git.exe"
    } else {
        "git"
    }
}

/// Canonicalize a path with a descriptive error.
///
/// On Windows the `\\?\` verbatim prefix is stripped so that the result can
/// be compared with paths reported by git.
pub fn safe_canonicalize(path: &Path) -> Result<PathBuf> {
    let canonical = path.canonicalize().with_context(|| {
        format!(
            "Failed to canonicalize path: {}\n\n\
                Possible causes:\n\
                - Path does not exist\n\
                - Permission denied\n\
                - Invalid path characters",
            path.display()
        )
    })?;

    #[cfg(windows)]
    {
        let display = canonical.display().to_string();
        if let Some(stripped) = display.strip_prefix(r"\\?\") {
            return Ok(PathBuf::from(stripped));
        }
    }

    Ok(canonical)
}

/// Render a path with forward slashes, the separator used in fmf names and
/// runtime test paths.
#[must_use]
pub fn normalize_path_separator(path: &Path) -> String {
    let display = path.display().to_string();
    if is_windows() {
        display.replace('\\', "/")
    } else {
        display
    }
}
