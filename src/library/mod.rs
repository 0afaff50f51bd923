//! Beakerlib library references and their resolution.
//!
//! A test's `require` list mixes plain package names with references to
//! beakerlib libraries. Two reference shapes exist:
//!
//! - short form `library(component/name)`, fetched from the default
//!   library host (`<host>/<component>`) at the default ref
//! - long form `library{url: ..., ref: ..., name: ...}`, an inline YAML
//!   mapping giving the repository explicitly
//!
//! [`Requirement::parse`] classifies a raw string, [`LibraryCache`] fetches
//! library repositories into the working area and [`RequirementExpander`]
//! replaces every reference by the plain requirements it transitively needs.

pub mod cache;
pub mod expander;

pub use cache::LibraryCache;
pub use expander::RequirementExpander;

use anyhow::Result;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::fmt;

use crate::constants::{DEFAULT_LIBRARY_HOST, DEFAULT_LIBRARY_NAME, DEFAULT_REF};
use crate::core::DiscoverError;

const SHORT_FORM: &str = r"^library\(([^)]+)\)$";
const LONG_FORM: &str = r"^library(\{[^}]+\})$";
const COMPONENT: &str = r"/([^/]+?)(/|\.git)?$";

/// Values filled in when a reference leaves something out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDefaults {
    /// Host prepended to a short-form component
    pub host: String,
    /// Revision used when none is given
    pub reference: String,
    /// Library node used when a long form has no `name`
    pub name: String,
}

impl Default for LibraryDefaults {
    fn default() -> Self {
        Self {
            host: DEFAULT_LIBRARY_HOST.to_string(),
            reference: DEFAULT_REF.to_string(),
            name: DEFAULT_LIBRARY_NAME.to_string(),
        }
    }
}

/// Canonical identity of a library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryIdentifier {
    /// Repository location
    pub url: String,
    /// Branch, tag or commit to check out
    pub revision: String,
    /// Last path segment of `url`; the on-disk cache key
    pub component: String,
    /// Library node name inside the repository's metadata tree
    pub name: String,
}

impl LibraryIdentifier {
    /// Node path of the library in its metadata tree.
    pub fn node_path(&self) -> String {
        format!("/{}", self.name.trim_start_matches('/'))
    }

    /// `url@revision`, used when reporting conflicts.
    pub fn source(&self) -> String {
        format!("{}@{}", self.url, self.revision)
    }
}

impl fmt::Display for LibraryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.component, self.node_path())
    }
}

/// A classified entry of a `require` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Anything that is not a library reference, kept verbatim.
    Plain(String),
    /// A short- or long-form library reference.
    Library(LibraryIdentifier),
}

impl Requirement {
    /// Classify `raw` (already trimmed).
    ///
    /// # Errors
    ///
    /// Returns [`DiscoverError::MalformedIdentifier`] when a string has one
    /// of the library shapes but its payload cannot be turned into an
    /// identifier: a short form that is not exactly `component/name`, a long
    /// form that is not a YAML mapping or whose `url` yields no component.
    pub fn parse(raw: &str, defaults: &LibraryDefaults) -> Result<Self> {
        if let Some(captures) = Regex::new(SHORT_FORM)?.captures(raw) {
            return parse_short(raw, &captures[1], defaults).map(Self::Library);
        }
        if let Some(captures) = Regex::new(LONG_FORM)?.captures(raw) {
            return parse_long(raw, &captures[1], defaults).map(Self::Library);
        }
        Ok(Self::Plain(raw.to_string()))
    }
}

fn parse_short(raw: &str, payload: &str, defaults: &LibraryDefaults) -> Result<LibraryIdentifier> {
    let parts: Vec<&str> = payload.split('/').collect();
    let [component, name] = parts.as_slice() else {
        return Err(malformed(raw, "expected exactly one '/' between component and name"));
    };
    if component.is_empty() || name.is_empty() {
        return Err(malformed(raw, "component and name must not be empty"));
    }
    check_component(raw, component)?;

    Ok(LibraryIdentifier {
        url: format!("{}/{}", defaults.host.trim_end_matches('/'), component),
        revision: defaults.reference.clone(),
        component: (*component).to_string(),
        name: (*name).to_string(),
    })
}

fn parse_long(raw: &str, payload: &str, defaults: &LibraryDefaults) -> Result<LibraryIdentifier> {
    let mapping: Mapping = serde_yaml::from_str(payload)
        .map_err(|e| malformed(raw, &format!("not a valid mapping: {e}")))?;

    let Some(url) = scalar(&mapping, "url") else {
        return Err(malformed(raw, "missing 'url'"));
    };
    let component = component_from_url(&url)?;

    Ok(LibraryIdentifier {
        revision: scalar(&mapping, "ref").unwrap_or_else(|| defaults.reference.clone()),
        name: scalar(&mapping, "name").unwrap_or_else(|| defaults.name.clone()),
        component,
        url,
    })
}

/// Derive the component name from the last path segment of `url`,
/// dropping a trailing slash or `.git`.
///
/// # Errors
///
/// [`DiscoverError::MalformedIdentifier`] naming `url` when no segment can
/// be extracted or the segment is `.` or `..`.
pub fn component_from_url(url: &str) -> Result<String> {
    let component = Regex::new(COMPONENT)?
        .captures(url)
        .map(|captures| captures[1].to_string())
        .ok_or_else(|| malformed(url, "unable to parse component from url"))?;
    check_component(url, &component)?;
    Ok(component)
}

/// The component names a directory under `libs/`, so it must not step
/// outside it.
fn check_component(identifier: &str, component: &str) -> Result<()> {
    if matches!(component, "." | "..") {
        return Err(malformed(identifier, &format!("'{component}' is not a valid component")));
    }
    Ok(())
}

fn scalar(mapping: &Mapping, key: &str) -> Option<String> {
    match mapping.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn malformed(identifier: &str, reason: &str) -> anyhow::Error {
    DiscoverError::MalformedIdentifier {
        identifier: identifier.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
