//! Integration tests for the fmf-discover binary
//!
//! Every test builds its own git repositories under a temporary directory
//! and uses their paths as URLs, so no network access is needed.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **discover**: local and remote test trees, selection, output formats
//! - **libraries**: library requirement expansion through the binary
//! - **errors**: exit status and messages of failing runs
//! - **show**: the `show` command

mod common;

mod discover;
mod errors;
mod libraries;
mod show;
