use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use tracing::{info, warn};

use super::{ApiError, Fetch};

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API base, e.g. `https://api.system.example.com`.
    pub api_endpoint: String,
    /// Sent verbatim as the `Authorization` header, e.g. `bearer eyJ...`.
    pub authorization: String,
    pub skip_ssl_validation: bool,
    pub timeout: Duration,
    /// Suppresses the per-request progress line.
    pub quiet: bool,
}

/// Blocking control-plane client. One request in flight at a time, no retries.
pub struct CfClient {
    http: Client,
    api_endpoint: String,
    authorization: String,
    quiet: bool,
}

impl CfClient {
    pub fn new(opts: ClientOptions) -> Result<Self> {
        if opts.skip_ssl_validation && !opts.quiet {
            warn!("skipping TLS validation");
        }

        let http = Client::builder()
            .timeout(opts.timeout)
            .danger_accept_invalid_certs(opts.skip_ssl_validation)
            .user_agent(concat!("report-buildpacks/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            api_endpoint: opts.api_endpoint.trim_end_matches('/').to_string(),
            authorization: opts.authorization,
            quiet: opts.quiet,
        })
    }

    pub fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }
}

impl Fetch for CfClient {
    fn fetch(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        let url = self.url_for(path);
        if !self.quiet {
            info!("GET {url}");
        }

        let resp = self
            .http
            .get(&url)
            .header(AUTHORIZATION, &self.authorization)
            .send()
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        if resp.status() != StatusCode::OK {
            return Err(ApiError::Status {
                url,
                status: resp.status().as_u16(),
            });
        }

        let body = resp.bytes().map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { url, source })
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.api_endpoint)
        } else {
            format!("{}/{path}", self.api_endpoint)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> CfClient {
        CfClient::new(ClientOptions {
            api_endpoint: endpoint.to_string(),
            authorization: "bearer test".to_string(),
            skip_ssl_validation: false,
            timeout: Duration::from_secs(5),
            quiet: true,
        })
        .expect("build client")
    }

    #[test]
    fn relative_paths_join_the_api_base() {
        let c = client("https://api.example.com/");
        assert_eq!(c.api_endpoint(), "https://api.example.com");
        assert_eq!(
            c.url_for("/v2/organizations"),
            "https://api.example.com/v2/organizations"
        );
        assert_eq!(
            c.url_for("v2/buildpacks"),
            "https://api.example.com/v2/buildpacks"
        );
    }

    #[test]
    fn absolute_urls_are_used_verbatim() {
        let c = client("https://api.example.com");
        assert_eq!(
            c.url_for("https://other.example.com/v2/apps?page=2"),
            "https://other.example.com/v2/apps?page=2"
        );
    }

    #[test]
    fn connection_refused_is_a_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let c = client(&format!("http://127.0.0.1:{port}"));
        let err = c.fetch("/v2/info").expect_err("should fail");
        assert!(matches!(err, ApiError::Transport { .. }), "{err:?}");
    }
}
