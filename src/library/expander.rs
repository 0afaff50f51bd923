//! Requirement expansion.
//!
//! Walks a `require` list left to right. Plain requirements are emitted as
//! they are; a library reference is fetched and replaced, in place, by the
//! expansion of the library node's own `require` list. The output keeps
//! traversal order and duplicates.
//!
//! The walk uses an explicit stack of frames, one per library being
//! expanded. A reference to a library that is already on the stack would
//! never terminate and is reported as [`DiscoverError::CircularDependency`].
//! The same library reached twice along different paths is not a cycle and
//! is expanded both times.

use anyhow::Result;
use std::collections::HashMap;
use std::vec;

use super::{LibraryCache, LibraryDefaults, LibraryIdentifier, Requirement};
use crate::core::DiscoverError;
use crate::fmf::Tree;

/// Pending requirements of one list being expanded.
struct Frame {
    pending: vec::IntoIter<String>,
    /// `(component, node path)` of the library this list belongs to;
    /// `None` for the top-level list
    library: Option<(String, String)>,
    label: String,
}

/// Expands library references into plain requirements.
pub struct RequirementExpander {
    cache: LibraryCache,
    defaults: LibraryDefaults,
    /// Loaded library trees by component
    trees: HashMap<String, Tree>,
}

impl RequirementExpander {
    pub fn new(cache: LibraryCache, defaults: LibraryDefaults) -> Self {
        Self {
            cache,
            defaults,
            trees: HashMap::new(),
        }
    }

    /// Expand `requirements` into a flat list of plain requirements.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed reference, fetch failure, missing
    /// library node or circular reference; nothing partial is returned.
    pub async fn expand(&mut self, requirements: &[String]) -> Result<Vec<String>> {
        let mut output = Vec::new();
        let mut stack = vec![Frame {
            pending: requirements.to_vec().into_iter(),
            library: None,
            label: String::new(),
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(raw) = frame.pending.next() else {
                stack.pop();
                continue;
            };

            let id = match Requirement::parse(raw.trim(), &self.defaults)? {
                Requirement::Plain(requirement) => {
                    output.push(requirement);
                    continue;
                }
                Requirement::Library(id) => id,
            };

            let key = (id.component.clone(), id.node_path());
            if stack.iter().any(|frame| frame.library.as_ref() == Some(&key)) {
                let mut chain: Vec<&str> = stack
                    .iter()
                    .filter(|frame| frame.library.is_some())
                    .map(|frame| frame.label.as_str())
                    .collect();
                let label = id.to_string();
                chain.push(&label);
                return Err(DiscoverError::CircularDependency {
                    chain: chain.join(" -> "),
                }
                .into());
            }

            tracing::debug!("Fetch beakerlib library '{}'.", id);
            let requires = self.library_requires(&id).await?;
            stack.push(Frame {
                pending: requires.into_iter(),
                library: Some(key),
                label: id.to_string(),
            });
        }

        Ok(output)
    }

    /// The `require` list of the library node `id` names.
    async fn library_requires(&mut self, id: &LibraryIdentifier) -> Result<Vec<String>> {
        let directory = self.cache.ensure(id).await?;

        if !self.trees.contains_key(&id.component) {
            let tree = Tree::load(&directory)?;
            self.trees.insert(id.component.clone(), tree);
        }
        let node = self
            .trees
            .get(&id.component)
            .and_then(|tree| tree.find(&id.node_path()))
            .ok_or_else(|| DiscoverError::LibraryNotFound {
                component: id.component.clone(),
                name: id.name.clone(),
            })?;

        Ok(node.get_list("require"))
    }
}
