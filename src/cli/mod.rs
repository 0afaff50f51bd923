//! Command-line interface for fmf-discover.
//!
//! # Commands
//!
//! - `discover` - materialize the test tree, select tests and expand their
//!   beakerlib library requirements; prints the tests as YAML or JSON
//! - `show` - print the effective discover step without running it
//!
//! Both take the step settings either from a plan (`--plan plan.yaml`) or
//! from options, options winning:
//!
//! ```bash
//! fmf-discover discover --url https://github.com/teemtee/tmt --ref main --filter 'tier: 1'
//! fmf-discover discover --path ./tests --test '^/basic' --format json
//! fmf-discover show --plan plans/smoke.yaml
//! ```
//!
//! # Global Options
//!
//! - `--verbose` - debug output, including git commands
//! - `--quiet` - errors only
//! - `--config` - global configuration file, also read from
//!   `FMF_DISCOVER_CONFIG`

mod common;
mod discover;
pub mod logging;
mod show;


pub use common::StepArgs;
pub use discover::OutputFormat;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::GlobalConfig;
use crate::constants::CONFIG_PATH_ENV;
use logging::Verbosity;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub verbosity: Option<Verbosity>,
    pub config_path: Option<PathBuf>,
}

#[derive(Parser)]
#[command(
    name = "fmf-discover",
    about = "Discover fmf tests and resolve their beakerlib library requirements",
    version,
    long_about = "Finds tests in an fmf metadata tree, local or cloned from git, and expands \
                  library(...) requirements into the plain packages they need."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global configuration file
    #[arg(short, long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover tests and print them
    Discover(discover::DiscoverCommand),

    /// Show the discover step settings
    Show(show::ShowCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        CliConfig {
            verbosity: Some(Verbosity::from_flags(self.verbose, self.quiet)),
            config_path: self.config.clone(),
        }
    }

    /// Run the selected command. Logging is only installed when
    /// `config.verbosity` is set, so tests can drive commands silently.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        if let Some(verbosity) = config.verbosity {
            logging::init(verbosity);
        }

        let global = GlobalConfig::load_with_optional(config.config_path).await?;

        match self.command {
            Commands::Discover(cmd) => cmd.execute(&global).await,
            Commands::Show(cmd) => cmd.execute(&global).await,
        }
    }
}
