//! fmf metadata tree loading and querying.
//!
//! An fmf tree is a directory hierarchy rooted at a directory containing a
//! `.fmf/` subdirectory. Every directory may hold a `main.fmf` file with the
//! directory node's own attributes, plus further `*.fmf` files that each
//! define a child node named after the file stem. Inside a file, keys that
//! start with `/` open child nodes; all other keys are attributes.
//!
//! ```text
//! tree/
//! ├── .fmf/version
//! ├── main.fmf             # data of "/"  (inherited by everything below)
//! ├── smoke.fmf            # node "/smoke"
//! └── tests/
//!     └── basic/
//!         └── main.fmf     # node "/tests/basic"
//! ```
//!
//! Children inherit their parent's attributes. A key with a trailing `+`
//! merges into the inherited value instead of replacing it: lists are
//! extended, strings concatenated and mappings updated.
//!
//! The tree is read eagerly by [`Tree::load`]; lookups and queries never
//! touch the file system again. Loading a directory below the root yields
//! only that subtree, named from the loaded directory as `/`.

pub mod filter;

use anyhow::{Context, Result};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{FMF_EXTENSION, FMF_MAIN_FILE, TEST_KEY};
use crate::core::DiscoverError;
use crate::utils::fs::find_tree_root;

/// A node of a loaded tree with its fully inherited attributes.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    data: Mapping,
    sources: Vec<PathBuf>,
    leaf: bool,
}

impl Node {
    /// Node name, `/` for the root and `/a/b` below it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes after inheritance.
    pub fn data(&self) -> &Mapping {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Attribute as a list of strings; a scalar becomes a one-element list
    /// and a missing key an empty one.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key).map(filter::stringify).unwrap_or_default()
    }

    /// Files (relative to the loaded directory) that defined this node's own data,
    /// in load order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Directory of the last file that defined this node, relative to the
    /// loaded directory; empty for that directory itself.
    pub fn source_dir(&self) -> PathBuf {
        self.sources
            .last()
            .and_then(|source| source.parent())
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// True when the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }
}

/// A loaded fmf metadata tree.
#[derive(Debug)]
pub struct Tree {
    root: PathBuf,
    nodes: BTreeMap<String, Node>,
}

impl Tree {
    /// Load the tree grown from `path`, which must lie at or below an fmf
    /// root. Nodes outside `path` are not read and `path` itself becomes `/`.
    ///
    /// # Errors
    ///
    /// - [`DiscoverError::MetadataTreeNotFound`] if no `.fmf` root exists at
    ///   or above `path`
    /// - [`DiscoverError::MetadataParseError`] if a file is not a YAML mapping
    ///   or a `+` key cannot be merged
    pub fn load(path: &Path) -> Result<Self> {
        let root = find_tree_root(path).ok_or_else(|| DiscoverError::MetadataTreeNotFound {
            path: path.display().to_string(),
        })?;
        tracing::debug!("Loading fmf tree '{}' from '{}'", root.display(), path.display());

        let mut raw = RawNode::default();
        grow(&mut raw, path, Path::new(""))?;

        let mut nodes = BTreeMap::new();
        inherit(raw, "/".to_string(), &Mapping::new(), &mut nodes)?;
        tracing::debug!("Loaded {} fmf nodes", nodes.len());

        Ok(Self {
            root,
            nodes,
        })
    }

    /// Directory holding the `.fmf` root marker.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a node by exact name; the leading slash is optional.
    pub fn find(&self, name: &str) -> Option<&Node> {
        let trimmed = name.trim_matches('/');
        if trimmed.is_empty() {
            self.nodes.get("/")
        } else {
            self.nodes.get(&format!("/{trimmed}"))
        }
    }

    /// All nodes in name order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Test nodes (leaves with a `test` attribute) selected by `filters`
    /// and `names`, in name order.
    pub fn tests(&self, filters: &[String], names: &[String]) -> Result<Vec<&Node>> {
        self.prune(&[TEST_KEY], names, filters)
    }

    /// Leaf nodes that have every attribute in `keys`, whose name matches
    /// any of `names` (regex search; no names selects all) and which satisfy
    /// every expression in `filters`.
    ///
    /// # Errors
    ///
    /// [`DiscoverError::InvalidPattern`] for a bad name regex and
    /// [`DiscoverError::InvalidFilter`] for a bad filter expression.
    pub fn prune(&self, keys: &[&str], names: &[String], filters: &[String]) -> Result<Vec<&Node>> {
        let patterns = names
            .iter()
            .map(|name| {
                Regex::new(name).map_err(|e| DiscoverError::InvalidPattern {
                    pattern: name.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut selected = Vec::new();
        for node in self.nodes.values() {
            if !node.is_leaf() || !keys.iter().all(|key| node.data.contains_key(*key)) {
                continue;
            }
            if !patterns.is_empty() && !patterns.iter().any(|p| p.is_match(&node.name)) {
                continue;
            }
            let mut keep = true;
            for expression in filters {
                if !filter::matches(expression, &node.data)? {
                    keep = false;
                    break;
                }
            }
            if keep {
                selected.push(node);
            }
        }
        Ok(selected)
    }
}

/// Node under construction: own data only, before inheritance.
#[derive(Debug, Default)]
struct RawNode {
    own: Mapping,
    sources: Vec<PathBuf>,
    children: BTreeMap<String, RawNode>,
}

impl RawNode {
    fn update(&mut self, mapping: Mapping, source: &Path) -> Result<()> {
        if !self.sources.iter().any(|s| s == source) {
            self.sources.push(source.to_path_buf());
        }
        for (key, value) in mapping {
            let child_name = key.as_str().and_then(|k| k.strip_prefix('/')).map(str::to_string);
            match child_name {
                Some(path) => {
                    let mut node = &mut *self;
                    for segment in path.split('/').filter(|s| !s.is_empty()) {
                        node = node.children.entry(segment.to_string()).or_default();
                    }
                    node.update(as_mapping(value, source)?, source)?;
                }
                None => {
                    self.own.insert(key, value);
                }
            }
        }
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.children.is_empty()
    }
}

fn as_mapping(value: Value, source: &Path) -> Result<Mapping> {
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => Err(DiscoverError::MetadataParseError {
            file: source.display().to_string(),
            reason: format!("expected a mapping, found {other:?}"),
        }
        .into()),
    }
}

fn read_fmf_file(path: &Path, relative: &Path) -> Result<Mapping> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read metadata file {}", path.display()))?;
    let value: Value =
        serde_yaml::from_str(&content).map_err(|e| DiscoverError::MetadataParseError {
            file: relative.display().to_string(),
            reason: e.to_string(),
        })?;
    as_mapping(value, relative)
}

/// Read `dir` into `node`: `main.fmf`, sibling `*.fmf` files, then subdirectories.
fn grow(node: &mut RawNode, dir: &Path, relative: &Path) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(std::fs::DirEntry::file_name);

    let main = dir.join(FMF_MAIN_FILE);
    if main.is_file() {
        let rel = relative.join(FMF_MAIN_FILE);
        node.update(read_fmf_file(&main, &rel)?, &rel)?;
    }

    for entry in &entries {
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().to_string();
        if file_name.starts_with('.') {
            continue;
        }

        if path.is_dir() {
            let child = node.children.entry(file_name.clone()).or_default();
            grow(child, &path, &relative.join(&file_name))?;
        } else if file_name != FMF_MAIN_FILE
            && path.extension().is_some_and(|ext| ext == FMF_EXTENSION)
        {
            let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
            let rel = relative.join(&file_name);
            let mapping = read_fmf_file(&path, &rel)?;
            node.children.entry(stem).or_default().update(mapping, &rel)?;
        }
    }

    // Directories without any metadata are not nodes
    node.children.retain(|_, child| !child.is_empty());
    Ok(())
}

fn inherit(
    raw: RawNode,
    name: String,
    parent: &Mapping,
    nodes: &mut BTreeMap<String, Node>,
) -> Result<()> {
    let mut data = parent.clone();
    merge(&mut data, raw.own, &name)?;
    let leaf = raw.children.is_empty();

    for (child, child_raw) in raw.children {
        let child_name = if name == "/" {
            format!("/{child}")
        } else {
            format!("{name}/{child}")
        };
        inherit(child_raw, child_name, &data, nodes)?;
    }

    nodes.insert(
        name.clone(),
        Node {
            name,
            data,
            sources: raw.sources,
            leaf,
        },
    );
    Ok(())
}

/// Apply a node's own attributes on top of inherited ones.
fn merge(data: &mut Mapping, own: Mapping, node: &str) -> Result<()> {
    for (key, value) in own {
        let Some(base) = key.as_str().and_then(|k| k.strip_suffix('+')).map(str::to_string) else {
            data.insert(key, value);
            continue;
        };

        let base_key = Value::String(base.clone());
        let merged = match (data.remove(&base_key), value) {
            (None, value) => value,
            (Some(Value::Sequence(mut inherited)), Value::Sequence(extra)) => {
                inherited.extend(extra);
                Value::Sequence(inherited)
            }
            (Some(Value::Sequence(mut inherited)), extra) => {
                inherited.push(extra);
                Value::Sequence(inherited)
            }
            (Some(Value::String(inherited)), Value::String(extra)) => {
                Value::String(inherited + &extra)
            }
            (Some(Value::Mapping(mut inherited)), Value::Mapping(extra)) => {
                inherited.extend(extra);
                Value::Mapping(inherited)
            }
            (Some(inherited), extra) => {
                return Err(DiscoverError::MetadataParseError {
                    file: node.to_string(),
                    reason: format!("cannot merge {extra:?} into '{base}' value {inherited:?}"),
                }
                .into());
            }
        };
        data.insert(base_key, merged);
    }
    Ok(())
}
