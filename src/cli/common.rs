//! Options shared by the `discover` and `show` commands.

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use crate::config::{GlobalConfig, StepData, StepOverrides};
use crate::utils::fs::find_tree_root;
use crate::workdir::WorkArea;

/// Where the tests come from and which of them to select.
///
/// Values given here take precedence over the plan passed with `--plan`.
#[derive(Args, Debug, Clone, Default)]
pub struct StepArgs {
    /// Git repository containing the metadata tree
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// Branch, tag or commit to check out
    #[arg(short = 'r', long = "ref", value_name = "REF")]
    pub reference: Option<String>,

    /// Path to the metadata tree root
    ///
    /// Relative to the repository root when `--url` is given, otherwise a
    /// local directory.
    #[arg(short = 'p', long)]
    pub path: Option<String>,

    /// Select tests by name (regular expression, repeatable)
    #[arg(short = 't', long = "test", value_name = "NAME")]
    pub test: Vec<String>,

    /// Select tests by filter expression (repeatable)
    ///
    /// ```bash
    /// fmf-discover discover --filter 'tier: 1' --filter 'component: httpd'
    /// ```
    #[arg(short = 'F', long = "filter", value_name = "FILTER")]
    pub filter: Vec<String>,

    /// Plan file with the discover step (YAML)
    #[arg(long, value_name = "FILE")]
    pub plan: Option<PathBuf>,

    /// Working area for cloned tests and libraries
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Report what would be done without cloning or copying anything
    #[arg(long)]
    pub dry: bool,
}

impl StepArgs {
    /// Step data from `--plan` with the command-line values applied.
    pub fn step_data(&self) -> Result<StepData> {
        let mut step = match &self.plan {
            Some(plan) => StepData::load(plan)?,
            None => StepData::default(),
        };
        step.apply(StepOverrides {
            url: self.url.clone(),
            reference: self.reference.clone(),
            path: self.path.clone(),
            test: self.test.clone(),
            filter: self.filter.clone(),
        });
        Ok(step)
    }

    /// `--workdir`, then the configured workdir, then a fresh temporary one.
    pub fn work_area(&self, config: &GlobalConfig) -> WorkArea {
        match self.workdir.as_ref().or(config.workdir.as_ref()) {
            Some(root) => WorkArea::new(root),
            None => WorkArea::unique(),
        }
    }
}

/// The metadata tree containing `cwd`, or `cwd` itself.
pub fn project_root(cwd: &Path) -> PathBuf {
    find_tree_root(cwd).unwrap_or_else(|| cwd.to_path_buf())
}
