use thiserror::Error;

/// Failures talking to the control plane.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("malformed JSON response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pagination of {path} did not terminate after {pages} page(s)")]
    PaginationLoop { path: String, pages: usize },
}
