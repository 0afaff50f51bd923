//! Utility modules shared by the resolver components.

pub mod fs;
pub mod platform;

pub use fs::{copy_dir, ensure_dir, find_tree_root, relative_path, remove_dir_all};
pub use platform::{get_git_command, is_windows, safe_canonicalize};
