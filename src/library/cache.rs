//! Library fetch cache.
//!
//! Each library component is cloned once into `libs/<component>` of the
//! working area. An existing directory is a cache hit and never touched
//! again, whichever revision it holds. Within a run the cache also remembers
//! the `url@revision` each component was requested with and refuses a second
//! request for the same component from a different source, since both would
//! silently share one checkout.

use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;

use super::LibraryIdentifier;
use crate::core::DiscoverError;
use crate::git::GitRepo;
use crate::utils::fs::{ensure_dir, remove_dir_all};
use crate::workdir::WorkArea;

/// Fetches library repositories into a working area, once per component.
#[derive(Debug)]
pub struct LibraryCache {
    work: WorkArea,
    /// component -> `url@revision` it was first requested with in this run
    fetched: HashMap<String, String>,
}

impl LibraryCache {
    pub fn new(work: WorkArea) -> Self {
        Self {
            work,
            fetched: HashMap::new(),
        }
    }

    /// Make sure the library's repository is present and return its directory.
    ///
    /// # Errors
    ///
    /// - [`DiscoverError::LibraryConflict`] if the component was already
    ///   requested in this run with a different url or revision
    /// - [`DiscoverError::GitCloneFailed`] / [`DiscoverError::GitCheckoutFailed`]
    ///   if fetching fails; a partial clone is removed
    pub async fn ensure(&mut self, id: &LibraryIdentifier) -> Result<PathBuf> {
        let directory = self.work.library_dir(&id.component);
        let requested = id.source();

        if let Some(fetched) = self.fetched.get(&id.component)
            && *fetched != requested
        {
            return Err(DiscoverError::LibraryConflict {
                component: id.component.clone(),
                fetched: fetched.clone(),
                requested,
            }
            .into());
        }

        if directory.is_dir() {
            tracing::debug!("Library '{}' already fetched.", id);
        } else {
            tracing::debug!("Fetch library '{}' from {}", id, requested);
            ensure_dir(&self.work.libs_dir())?;
            if let Err(e) = fetch(id, &directory).await {
                remove_dir_all(&directory)?;
                return Err(e);
            }
        }

        self.fetched.insert(id.component.clone(), requested);
        Ok(directory)
    }
}

async fn fetch(id: &LibraryIdentifier, directory: &std::path::Path) -> Result<()> {
    let repo = GitRepo::clone(&id.url, directory).await?;
    repo.checkout(&id.revision).await
}
