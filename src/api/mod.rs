mod client;
mod error;
pub mod model;
mod paginate;

use serde::de::DeserializeOwned;

pub use client::{CfClient, ClientOptions};
pub use error::ApiError;
pub use paginate::{DEFAULT_MAX_PAGES, list_all};

/// Something that can answer a GET with a JSON document.
///
/// `path` is either relative to the API base (`/v2/organizations`) or an
/// absolute URL handed back by the API itself.
pub trait Fetch {
    fn fetch(&self, path: &str) -> Result<serde_json::Value, ApiError>;

    /// Display form of `path`, used in error messages.
    fn url_for(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Fetch `path` and decode it as `T`.
pub fn fetch_as<T, F>(source: &F, path: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    F: Fetch + ?Sized,
{
    let value = source.fetch(path)?;
    serde_json::from_value(value).map_err(|source_err| ApiError::Decode {
        url: source.url_for(path),
        source: source_err,
    })
}
