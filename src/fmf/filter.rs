//! Filter expressions over node attributes.
//!
//! Grammar (whitespace around operators is ignored):
//!
//! ```text
//! expression  := clause ( '|' clause )*
//! clause      := literal ( '&' literal )*
//! literal     := key ':' value ( ',' value )*
//! value       := '-'? text
//! ```
//!
//! A literal matches when any of its values matches: a plain value must be
//! among the node's values for `key`, a `-value` must be absent. Scalars and
//! lists are both compared as strings, so `tier: 1` matches `tier: 1` as well
//! as `tier: [1, 2]`. A literal on a key the node does not have matches only
//! when all of its values are negated.

use anyhow::Result;
use serde_yaml::{Mapping, Value};

use crate::core::DiscoverError;

/// Evaluate `expression` against a node's attributes.
///
/// # Errors
///
/// Returns [`DiscoverError::InvalidFilter`] when a literal lacks a `key:` part
/// or a value list is empty.
pub fn matches(expression: &str, data: &Mapping) -> Result<bool> {
    if expression.trim().is_empty() {
        return Err(invalid(expression, "empty filter"));
    }

    for clause in expression.split('|') {
        let mut clause_matches = true;
        for literal in clause.split('&') {
            if !literal_matches(expression, literal, data)? {
                clause_matches = false;
                // Keep parsing so that syntax errors surface regardless of data
            }
        }
        if clause_matches {
            return Ok(true);
        }
    }
    Ok(false)
}

fn literal_matches(expression: &str, literal: &str, data: &Mapping) -> Result<bool> {
    let Some((key, values)) = literal.split_once(':') else {
        return Err(invalid(expression, &format!("missing ':' in '{}'", literal.trim())));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(invalid(expression, &format!("missing key in '{}'", literal.trim())));
    }

    let atoms: Vec<&str> = values.split(',').map(str::trim).collect();
    if atoms.iter().any(|atom| atom.is_empty() || *atom == "-") {
        return Err(invalid(expression, &format!("empty value for '{key}'")));
    }

    let Some(node_values) = data.get(key).map(stringify) else {
        return Ok(atoms.iter().all(|atom| atom.starts_with('-')));
    };

    Ok(atoms.iter().any(|atom| match atom.strip_prefix('-') {
        Some(negated) => !node_values.iter().any(|v| v == negated),
        None => node_values.iter().any(|v| v == atom),
    }))
}

/// Flatten a scalar or a list of scalars into strings.
pub(crate) fn stringify(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.iter().filter_map(scalar_to_string).collect(),
        other => scalar_to_string(other).into_iter().collect(),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn invalid(expression: &str, reason: &str) -> anyhow::Error {
    DiscoverError::InvalidFilter {
        filter: expression.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
