//! fmf test discovery.
//!
//! [`DiscoverFmf`] runs one discover step: [`TestTreeResolver`] materializes
//! the test tree and selects tests, then every test's `require` list is
//! expanded by a single [`RequirementExpander`], so each library is fetched
//! at most once per run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use fmf_discover::config::{GlobalConfig, StepData};
//! use fmf_discover::discover::DiscoverFmf;
//! use fmf_discover::workdir::WorkArea;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let step = StepData::from_yaml("url: https://github.com/teemtee/tmt\nfilter: 'tier: 1'\n")?;
//! let mut discover = DiscoverFmf::new(step, WorkArea::unique(), ".", &GlobalConfig::default());
//! discover.go().await?;
//! for test in discover.tests() {
//!     println!("{} {:?}", test.path, test.require);
//! }
//! # Ok(())
//! # }
//! ```

pub mod tree;

pub use tree::{TestSource, TestTreeResolver};

use anyhow::Result;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::PathBuf;

use crate::config::{GlobalConfig, StepData};
use crate::fmf::Node;
use crate::git::ensure_git_available;
use crate::library::{LibraryCache, LibraryDefaults, RequirementExpander};
use crate::utils::platform::normalize_path_separator;
use crate::workdir::WorkArea;

/// A discovered test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestRecord {
    /// Node name in the metadata tree, e.g. `/basic`.
    pub name: String,
    /// Directory of the test; relative to the tree until resolution, then
    /// the run-time location under `/tests`.
    pub path: String,
    /// Requirements; plain packages only once discovery has finished.
    pub require: Vec<String>,
    /// All other attributes.
    #[serde(flatten)]
    pub attributes: Mapping,
}

impl TestRecord {
    /// Build a record from a tree node. `path` defaults to the directory of
    /// the file that defined the node.
    pub fn from_node(node: &Node) -> Self {
        let path = match node.get("path") {
            Some(Value::String(path)) => path.clone(),
            _ => {
                let directory = normalize_path_separator(&node.source_dir());
                format!("/{directory}")
            }
        };

        let mut attributes = node.data().clone();
        for key in ["path", "require"] {
            attributes.remove(key);
        }

        Self {
            name: node.name().to_string(),
            path,
            require: node.get_list("require"),
            attributes,
        }
    }
}

/// One fmf discover step.
pub struct DiscoverFmf {
    step: StepData,
    work: WorkArea,
    project_root: PathBuf,
    default_ref: String,
    defaults: LibraryDefaults,
    dry: bool,
    tests: Vec<TestRecord>,
}

impl DiscoverFmf {
    pub fn new(
        step: StepData,
        work: WorkArea,
        project_root: impl Into<PathBuf>,
        config: &GlobalConfig,
    ) -> Self {
        Self {
            step,
            work,
            project_root: project_root.into(),
            default_ref: config.default_ref.clone(),
            defaults: config.library_defaults(),
            dry: false,
            tests: Vec::new(),
        }
    }

    /// Preview mode: report what would be done and discover nothing.
    pub fn dry(mut self, dry: bool) -> Self {
        self.dry = dry;
        self
    }

    /// Discover tests and expand their requirements.
    ///
    /// # Errors
    ///
    /// Any error of [`TestTreeResolver::resolve`] or
    /// [`RequirementExpander::expand`]; the first one aborts the run.
    pub async fn go(&mut self) -> Result<()> {
        if !self.dry {
            ensure_git_available()?;
            self.work.create()?;
        }
        tracing::debug!("Working area: {}", self.work.root().display());

        let source = TestSource {
            url: self.step.url.clone(),
            path: self.step.path.clone(),
            reference: self.step.effective_ref(&self.default_ref),
        };
        let resolver = TestTreeResolver::new(&self.work, &self.project_root).dry(self.dry);
        let mut tests = resolver.resolve(&source, &self.step.filter, &self.step.test).await?;

        let mut expander =
            RequirementExpander::new(LibraryCache::new(self.work.clone()), self.defaults.clone());
        for test in &mut tests {
            if !test.require.is_empty() {
                test.require = expander.expand(&test.require).await?;
            }
        }

        self.tests = tests;
        Ok(())
    }

    /// Tests found by the last [`DiscoverFmf::go`]; empty before the first.
    pub fn tests(&self) -> &[TestRecord] {
        &self.tests
    }

    /// The step's settings as key/value pairs.
    pub fn show(&self) -> Vec<(&'static str, String)> {
        self.step.show()
    }

    pub fn work_area(&self) -> &WorkArea {
        &self.work
    }
}
