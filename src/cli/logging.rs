//! Log output for the command-line tool.
//!
//! Everything goes to stderr so that discovered tests printed on stdout can
//! be piped. `RUST_LOG` takes precedence over the flags.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    /// `--quiet` wins over `--verbose`.
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    pub const fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
        }
    }

    /// Filter directive used when `RUST_LOG` is unset.
    pub fn directive(self) -> String {
        let level = self.level();
        // git targets are only interesting when debugging
        let git = if self == Self::Verbose { level } else { Level::WARN };
        format!("fmf_discover={level},git={git}")
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbosity: Verbosity) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity == Verbosity::Verbose)
        .with_thread_ids(false)
        .compact();

    let result = if verbosity == Verbosity::Verbose {
        builder.try_init()
    } else {
        builder.without_time().try_init()
    };
    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
