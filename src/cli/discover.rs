//! `fmf-discover discover`: resolve tests and print them.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use super::common::{StepArgs, project_root};
use crate::config::GlobalConfig;
use crate::discover::{DiscoverFmf, TestRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Discover tests, expand their library requirements and print the result.
#[derive(Args, Debug)]
pub struct DiscoverCommand {
    #[command(flatten)]
    pub step: StepArgs,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

impl DiscoverCommand {
    pub async fn execute(self, config: &GlobalConfig) -> Result<()> {
        let step = self.step.step_data()?;
        let work = self.step.work_area(config);
        let cwd = std::env::current_dir().context("Failed to read the current directory")?;

        let mut discover =
            DiscoverFmf::new(step, work, project_root(&cwd), config).dry(self.step.dry);
        discover.go().await?;

        print!("{}", render(discover.tests(), self.format)?);
        Ok(())
    }
}

/// Serialize tests for stdout.
pub fn render(tests: &[TestRecord], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(tests)?,
        OutputFormat::Json => serde_json::to_string_pretty(tests)? + "\n",
    })
}
