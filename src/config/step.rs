//! Discover step data.
//!
//! The `discover` section of a plan, written in YAML:
//!
//! ```yaml
//! discover:
//!     how: fmf
//!     url: https://github.com/psss/tmt
//!     ref: main
//!     path: /tests/full
//!     test: [basic, advanced]
//!     filter: 'tier: 1'
//! ```
//!
//! `repository` and `revision` are accepted as older spellings of `url` and
//! `ref`. `test` and `filter` take either one string or a list. Keys that
//! belong to other tools are ignored.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::path::Path;

use crate::core::DiscoverError;

/// The only discovery method this crate implements.
pub const HOW: &str = "fmf";

/// Settings of one fmf discover step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how: Option<String>,

    /// Repository to clone the tests from.
    #[serde(default, alias = "repository", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Branch, tag or commit to check out.
    #[serde(
        default,
        rename = "ref",
        alias = "revision",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference: Option<String>,

    /// Metadata tree location, relative to the repository root for `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Test name patterns.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub test: Vec<String>,

    /// Filter expressions.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<String>,
}

/// Command-line values that take precedence over step data.
#[derive(Debug, Clone, Default)]
pub struct StepOverrides {
    pub url: Option<String>,
    pub reference: Option<String>,
    pub path: Option<String>,
    pub test: Vec<String>,
    pub filter: Vec<String>,
}

impl StepData {
    /// Parse step data from YAML, either the step mapping itself or a plan
    /// holding it under `discover`.
    ///
    /// # Errors
    ///
    /// [`DiscoverError::YamlError`] for invalid YAML and
    /// [`DiscoverError::ConfigError`] when `how` names another method.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(content).map_err(DiscoverError::from)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        if let Some(discover) = value.get("discover").cloned() {
            value = discover;
        }

        let data: Self = serde_yaml::from_value(value).map_err(DiscoverError::from)?;
        data.validate()?;
        Ok(data)
    }

    /// Read step data from a plan file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid plan {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        match self.how.as_deref() {
            None | Some(HOW) => Ok(()),
            Some(other) => Err(DiscoverError::ConfigError {
                message: format!("Unsupported discover method '{other}', only '{HOW}' is available"),
            }
            .into()),
        }
    }

    /// Apply command-line overrides; lists replace rather than extend.
    pub fn apply(&mut self, overrides: StepOverrides) {
        if overrides.url.is_some() {
            self.url = overrides.url;
        }
        if overrides.reference.is_some() {
            self.reference = overrides.reference;
        }
        if overrides.path.is_some() {
            self.path = overrides.path;
        }
        if !overrides.test.is_empty() {
            self.test = overrides.test;
        }
        if !overrides.filter.is_empty() {
            self.filter = overrides.filter;
        }
    }

    /// The revision to check out: the explicit ref, or `default_ref` for a
    /// remote repository.
    pub fn effective_ref(&self, default_ref: &str) -> Option<String> {
        self.reference
            .clone()
            .or_else(|| self.url.as_ref().map(|_| default_ref.to_string()))
    }

    /// Key/value pairs describing the step, in display order.
    pub fn show(&self) -> Vec<(&'static str, String)> {
        let mut lines = Vec::new();
        if let Some(url) = &self.url {
            lines.push(("url", url.clone()));
        }
        if let Some(reference) = &self.reference {
            lines.push(("ref", reference.clone()));
        }
        if let Some(path) = &self.path {
            lines.push(("path", path.clone()));
        }
        if !self.test.is_empty() {
            lines.push(("test", self.test.join(", ")));
        }
        if !self.filter.is_empty() {
            lines.push(("filter", self.filter.join(", ")));
        }
        lines
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}
