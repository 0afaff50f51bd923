//! Global configuration for fmf-discover.
//!
//! User-wide defaults live in `~/.fmf-discover/config.toml`
//! (`%LOCALAPPDATA%\fmf-discover\config.toml` on Windows). Every key is
//! optional; a missing file means built-in defaults.
//!
//! ```toml
//! # Where short-form library(component/name) references are fetched from
//! library_host = "https://github.com/beakerlib-libraries"
//!
//! # Revision for libraries and remote test repositories without a ref
//! default_ref = "master"
//!
//! # Library node used by library{...} references without a name
//! default_library_name = "main"
//!
//! # Working area to reuse between runs (a fresh temp dir otherwise)
//! workdir = "/var/tmp/fmf-discover"
//! ```
//!
//! The path can be overridden with `--config` or the `FMF_DISCOVER_CONFIG`
//! environment variable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{DEFAULT_LIBRARY_HOST, DEFAULT_LIBRARY_NAME, DEFAULT_REF};
use crate::core::DiscoverError;
use crate::library::LibraryDefaults;

/// User-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Host prefix for short-form library references.
    pub library_host: String,

    /// Revision used when a library or remote test repository names none.
    pub default_ref: String,

    /// Library node for long-form references without `name`.
    pub default_library_name: String,

    /// Fixed working area; a unique temp directory per run when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            library_host: DEFAULT_LIBRARY_HOST.to_string(),
            default_ref: DEFAULT_REF.to_string(),
            default_library_name: DEFAULT_LIBRARY_NAME.to_string(),
            workdir: None,
        }
    }
}

impl GlobalConfig {
    /// Load from `path` when given, otherwise from [`GlobalConfig::default_path`].
    ///
    /// A missing file yields the defaults. An explicitly given path that does
    /// not exist is still an error, since it is most likely a typo.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(DiscoverError::ConfigError {
                    message: format!("Configuration file {} does not exist", path.display()),
                }
                .into());
            }
            return Self::load_from(&path).await;
        }

        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No global config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid TOML or sets an empty
    /// `library_host`, `default_ref` or `default_library_name`.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .map_err(DiscoverError::from)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))?;
        config.validate()?;

        tracing::debug!("Loaded global config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("library_host", &self.library_host),
            ("default_ref", &self.default_ref),
            ("default_library_name", &self.default_library_name),
        ] {
            if value.trim().is_empty() {
                return Err(DiscoverError::ConfigError {
                    message: format!("'{key}' must not be empty"),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Platform default location of the config file.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("fmf-discover")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".fmf-discover")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Defaults applied while parsing library references.
    pub fn library_defaults(&self) -> LibraryDefaults {
        LibraryDefaults {
            host: self.library_host.clone(),
            reference: self.default_ref.clone(),
            name: self.default_library_name.clone(),
        }
    }
}
