//! Session details normally handed over by the hosting `cf` CLI.
//!
//! Run standalone, the tool reads them from explicit configuration first, then
//! from the cf CLI itself (`cf oauth-token`) and its `config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::config::EffectiveConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSession {
    pub api_endpoint: String,
    pub authorization: String,
    pub skip_ssl_validation: bool,
}

/// The subset of `~/.cf/config.json` the report needs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfCliConfig {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default, rename = "SSLDisabled")]
    pub ssl_disabled: Option<bool>,
}

/// `$CF_HOME/.cf/config.json`, else `$HOME/.cf/config.json`.
pub fn cf_config_path(cf_home: Option<&Path>, home_dir: &Path) -> PathBuf {
    cf_home.unwrap_or(home_dir).join(".cf").join("config.json")
}

pub fn read_cf_config(path: &Path) -> Result<Option<CfCliConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read cf CLI config: {}", path.display()))?;
    let cfg = serde_json::from_str(&s)
        .with_context(|| format!("failed to parse cf CLI config: {}", path.display()))?;
    Ok(Some(cfg))
}

/// Asks the cf CLI for a fresh token. `None` when the CLI is unavailable or
/// refuses; the caller falls back to the stored token.
fn oauth_token(cf_command: &str, timeout: Duration) -> Option<String> {
    match crate::platform::run_command(cf_command, &["oauth-token"], timeout) {
        Ok(out) if out.exit_code == 0 => {
            let token = out.stdout.lines().map(str::trim).find(|l| !l.is_empty())?;
            Some(token.to_string())
        }
        Ok(out) => {
            debug!(
                "{cf_command} oauth-token exited with {}: {}",
                out.exit_code,
                out.stderr.trim()
            );
            None
        }
        Err(err) => {
            debug!("{cf_command} oauth-token unavailable: {err:#}");
            None
        }
    }
}

pub fn resolve(cfg: &EffectiveConfig, home_dir: &Path) -> Result<HostSession> {
    let cf_home = std::env::var_os("CF_HOME").map(PathBuf::from);
    let cf_cfg = read_cf_config(&cf_config_path(cf_home.as_deref(), home_dir))
        .map_err(crate::exit::invalid_args_err)?
        .unwrap_or_default();

    let timeout = Duration::from_secs(cfg.api.timeout_secs);
    resolve_with(cfg, &cf_cfg, || {
        if cfg.host.refresh_token {
            oauth_token(&cfg.host.cf_command, timeout)
        } else {
            None
        }
    })
}

fn resolve_with(
    cfg: &EffectiveConfig,
    cf_cfg: &CfCliConfig,
    refresh: impl FnOnce() -> Option<String>,
) -> Result<HostSession> {
    let api_endpoint = cfg
        .api
        .endpoint
        .clone()
        .or_else(|| cf_cfg.target.clone().filter(|s| !s.trim().is_empty()))
        .ok_or_else(|| {
            crate::exit::invalid_args(
                "no API endpoint: run `cf api` / `cf login`, or set REPORT_BUILDPACKS_API",
            )
        })?;

    let authorization = match &cfg.api.token {
        Some(token) => token.clone(),
        None => refresh()
            .or_else(|| cf_cfg.access_token.clone().filter(|s| !s.trim().is_empty()))
            .ok_or_else(|| {
                crate::exit::invalid_args(
                    "no access token: run `cf login`, or set REPORT_BUILDPACKS_TOKEN",
                )
            })?,
    };

    let skip_ssl_validation = cfg
        .api
        .skip_ssl_validation
        .or(cf_cfg.ssl_disabled)
        .unwrap_or(false);

    Ok(HostSession {
        api_endpoint: api_endpoint.trim().trim_end_matches('/').to_string(),
        authorization,
        skip_ssl_validation,
    })
}
