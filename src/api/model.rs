//! Typed projections of the control-plane resources the report reads.
//!
//! Each endpoint decodes into its own entity type. Fields the API may send as
//! `null` are `Option`s; anything the report does not consume is ignored.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A v2 list item: `{ "metadata": {...}, "entity": {...} }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Resource<E> {
    #[serde(default)]
    pub metadata: Metadata,
    pub entity: E,
}

/// One page of a v2 listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub next_url: Option<String>,
    #[serde(default)]
    pub resources: Vec<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Organization {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spaces_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Space {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub apps_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct App {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub buildpack: Option<String>,
    #[serde(default)]
    pub detected_buildpack: Option<String>,
    /// Per-instance memory in MB.
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instances: i64,
}

impl App {
    pub fn total_memory(&self) -> i64 {
        self.memory.saturating_mul(self.instances)
    }

    /// Configured buildpack, then detected buildpack; first non-empty wins.
    pub fn fallback_buildpack(&self) -> Option<&str> {
        [self.buildpack.as_deref(), self.detected_buildpack.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Buildpack {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
    #[serde(default)]
    pub filename: Option<String>,
}

/// v3 `GET /v3/apps/:guid/droplets/current`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Droplet {
    #[serde(default, deserialize_with = "null_as_default")]
    pub buildpacks: Vec<BuildpackUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildpackUsage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub buildpack_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
