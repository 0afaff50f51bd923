//! The per-run working area.
//!
//! ```text
//! <root>/
//! ├── .fmf-discover-tests  # marks tests/ as ours to replace
//! ├── tests/               # materialized test tree (clone or copy)
//! └── libs/<component>/    # one checkout per fetched library
//! ```
//!
//! A [`WorkArea`] is passed explicitly to every component that touches disk,
//! so separate runs stay isolated as long as they use different roots.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::constants::{LIBS_DIR, TESTS_DIR, TESTS_MARKER_FILE};
use crate::utils::fs::ensure_dir;

/// Handle to a run's working area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkArea {
    root: PathBuf,
}

impl WorkArea {
    /// Use `root` as the working area. Nothing is created yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// A fresh working area under the system temp directory.
    pub fn unique() -> Self {
        let run = format!("run-{}", uuid::Uuid::new_v4().simple());
        Self::new(std::env::temp_dir().join("fmf-discover").join(run))
    }

    /// Create the root directory if needed.
    pub fn create(&self) -> Result<()> {
        ensure_dir(&self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the test tree is materialized.
    pub fn tests_dir(&self) -> PathBuf {
        self.root.join(TESTS_DIR)
    }

    /// Marker written before the test tree is materialized.
    pub fn tests_marker(&self) -> PathBuf {
        self.root.join(TESTS_MARKER_FILE)
    }

    /// Parent of all library checkouts.
    pub fn libs_dir(&self) -> PathBuf {
        self.root.join(LIBS_DIR)
    }

    /// Checkout location of a library component.
    pub fn library_dir(&self, component: &str) -> PathBuf {
        self.libs_dir().join(component)
    }
}
