//! fmf-discover - test discovery for fmf metadata trees
//!
//! Finds the tests of an [fmf](https://fmf.readthedocs.io) metadata tree,
//! either in a local directory or in a git repository, and resolves their
//! requirements. A requirement is either a plain package name or a
//! reference to a beakerlib library:
//!
//! ```yaml
//! require:
//!   - httpd
//!   - library(httpd/http)
//!   - library{url: https://github.com/beakerlib/openssl, ref: devel, name: /certgen}
//! ```
//!
//! Library references are fetched into the working area and replaced, in
//! place, by the requirements of the library itself, recursively, so every
//! discovered test ends up with a flat list of packages.
//!
//! # Architecture Overview
//!
//! A run owns a [`workdir::WorkArea`] with two subdirectories:
//! - `tests/` - the materialized test tree (a clone, or a copy of the local
//!   git root)
//! - `libs/<component>/` - one clone per library component, fetched at most
//!   once per run
//!
//! Discovered test paths are rewritten to `/tests/<path>`, where the tree
//! lives at test run time.
//!
//! # Core Modules
//!
//! - [`fmf`] - metadata tree loading, inheritance and test selection
//! - [`library`] - library identifiers, the fetch cache and requirement expansion
//! - [`discover`] - test tree resolution and the discover step itself
//! - [`config`] - global TOML configuration and YAML step data
//! - [`git`] - async wrapper around the system git command
//! - [`core`] - error types and user-facing error formatting
//! - [`cli`] - the `fmf-discover` command line
//! - [`utils`] - filesystem and platform helpers

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod discover;
pub mod fmf;
pub mod git;
pub mod library;
pub mod utils;
pub mod workdir;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
