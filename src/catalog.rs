use std::collections::HashMap;

use tracing::debug;

use crate::api::model::{Buildpack, Resource};
use crate::api::{ApiError, Fetch, list_all};

pub const BUILDPACKS_PATH: &str = "/v2/buildpacks";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Uploaded file name, e.g. `java-buildpack-v4.20.zip`.
    pub filename: String,
}

impl CatalogEntry {
    /// Whether the uploaded file is the given version (`...v{version}.zip`).
    pub fn has_version(&self, version: &str) -> bool {
        self.filename.ends_with(&format!("v{version}.zip"))
    }
}

/// Enabled buildpacks keyed by name.
#[derive(Debug, Clone, Default)]
pub struct BuildpackCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl BuildpackCatalog {
    /// Lists every buildpack and keeps the enabled ones. When two enabled
    /// buildpacks share a name the one listed later replaces the earlier.
    pub fn build<F: Fetch + ?Sized>(source: &F, max_pages: usize) -> Result<Self, ApiError> {
        let mut catalog = Self::default();
        list_all(source, BUILDPACKS_PATH, max_pages, |bp: Resource<Buildpack>| {
            catalog.insert(bp.entity);
            Ok(())
        })?;
        debug!("{} enabled buildpack(s) in catalog", catalog.len());
        Ok(catalog)
    }

    pub fn insert(&mut self, bp: Buildpack) {
        if !bp.enabled {
            return;
        }
        if self.entries.contains_key(&bp.name) {
            debug!("buildpack {} listed twice; keeping the later entry", bp.name);
        }
        self.entries.insert(
            bp.name,
            CatalogEntry {
                filename: bp.filename.unwrap_or_default(),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
