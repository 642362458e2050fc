use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_MAX_PAGES;

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub api: ApiConfig,
    pub report: ReportConfig,
    pub host: HostConfig,
    pub log: LogConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub token_set: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_ssl_validation: Option<bool>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportConfig {
    pub max_pages: usize,
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostConfig {
    pub cf_command: String,
    pub refresh_token: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other} (expected table|json)")),
        }
    }
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                endpoint: None,
                token: None,
                token_set: false,
                skip_ssl_validation: None,
                timeout_secs: 30,
            },
            report: ReportConfig {
                max_pages: DEFAULT_MAX_PAGES,
                output: OutputFormat::Table,
            },
            host: HostConfig {
                cf_command: "cf".to_string(),
                refresh_token: true,
            },
            log: LogConfig {
                level: "info".to_string(),
            },
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    api: Option<RawApiConfig>,
    report: Option<RawReportConfig>,
    host: Option<RawHostConfig>,
    log: Option<RawLogConfig>,
}

#[derive(Debug, Deserialize)]
struct RawApiConfig {
    endpoint: Option<String>,
    token: Option<String>,
    skip_ssl_validation: Option<bool>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawReportConfig {
    max_pages: Option<usize>,
    output: Option<OutputFormat>,
}

#[derive(Debug, Deserialize)]
struct RawHostConfig {
    cf_command: Option<String>,
    refresh_token: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawLogConfig {
    level: Option<String>,
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/report-buildpacks/config.toml")
}

pub fn load(config_path: Option<&Path>, home_dir: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let explicit = config_path.is_some();
    let path = config_path
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| default_config_path(home_dir));

    if path.exists() {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&s)
            .with_context(|| format!("failed to parse config file (TOML): {}", path.display()))?;
        apply_raw_config(&mut cfg, raw);
        cfg.config_path = Some(path.display().to_string());
    } else if explicit {
        anyhow::bail!("config file not found: {}", path.display());
    }

    apply_env_overrides(&mut cfg)?;
    validate(&cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(api) = raw.api {
        if let Some(endpoint) = non_empty(api.endpoint) {
            cfg.api.endpoint = Some(endpoint);
        }
        if let Some(token) = non_empty(api.token) {
            cfg.api.token = Some(token);
        }
        if let Some(skip) = api.skip_ssl_validation {
            cfg.api.skip_ssl_validation = Some(skip);
        }
        if let Some(timeout_secs) = api.timeout_secs {
            cfg.api.timeout_secs = timeout_secs;
        }
    }

    if let Some(report) = raw.report {
        if let Some(max_pages) = report.max_pages {
            cfg.report.max_pages = max_pages;
        }
        if let Some(output) = report.output {
            cfg.report.output = output;
        }
    }

    if let Some(host) = raw.host {
        if let Some(cf_command) = non_empty(host.cf_command) {
            cfg.host.cf_command = cf_command;
        }
        if let Some(refresh_token) = host.refresh_token {
            cfg.host.refresh_token = refresh_token;
        }
    }

    if let Some(log) = raw.log {
        if let Some(level) = non_empty(log.level) {
            cfg.log.level = level;
        }
    }

    cfg.api.token_set = cfg.api.token.is_some();
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("REPORT_BUILDPACKS_API") {
        if let Some(v) = non_empty(Some(v)) {
            cfg.api.endpoint = Some(v);
        }
    }
    if let Ok(v) = std::env::var("REPORT_BUILDPACKS_TOKEN") {
        if let Some(v) = non_empty(Some(v)) {
            cfg.api.token = Some(v);
        }
    }
    if let Ok(v) = std::env::var("REPORT_BUILDPACKS_SKIP_SSL_VALIDATION") {
        cfg.api.skip_ssl_validation =
            Some(parse_bool(&v).context("REPORT_BUILDPACKS_SKIP_SSL_VALIDATION")?);
    }
    if let Ok(v) = std::env::var("REPORT_BUILDPACKS_TIMEOUT_SECS") {
        cfg.api.timeout_secs = v
            .trim()
            .parse::<u64>()
            .context("REPORT_BUILDPACKS_TIMEOUT_SECS")?;
    }
    if let Ok(v) = std::env::var("REPORT_BUILDPACKS_MAX_PAGES") {
        cfg.report.max_pages = v
            .trim()
            .parse::<usize>()
            .context("REPORT_BUILDPACKS_MAX_PAGES")?;
    }
    if let Ok(v) = std::env::var("REPORT_BUILDPACKS_OUTPUT") {
        cfg.report.output = v
            .parse::<OutputFormat>()
            .map_err(anyhow::Error::msg)
            .context("REPORT_BUILDPACKS_OUTPUT")?;
    }
    if let Ok(v) = std::env::var("REPORT_BUILDPACKS_CF_COMMAND") {
        if let Some(v) = non_empty(Some(v)) {
            cfg.host.cf_command = v;
        }
    }
    if let Ok(v) = std::env::var("REPORT_BUILDPACKS_REFRESH_TOKEN") {
        cfg.host.refresh_token = parse_bool(&v).context("REPORT_BUILDPACKS_REFRESH_TOKEN")?;
    }
    if let Ok(v) = std::env::var("REPORT_BUILDPACKS_LOG_LEVEL") {
        if let Some(v) = non_empty(Some(v)) {
            cfg.log.level = v;
        }
    }

    cfg.api.token_set = cfg.api.token.is_some();
    Ok(())
}

fn validate(cfg: &EffectiveConfig) -> Result<()> {
    if cfg.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs must be greater than 0");
    }
    if cfg.report.max_pages == 0 {
        anyhow::bail!("report.max_pages must be greater than 0");
    }
    Ok(())
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "invalid boolean: {s} (expected true|false|1|0|yes|no|on|off)"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        for s in ["1", "true", "YES", " on "] {
            assert!(parse_bool(s).expect(s));
        }
        for s in ["0", "false", "No", "off"] {
            assert!(!parse_bool(s).expect(s));
        }
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn raw_config_overrides_defaults() {
        let raw: RawConfig = toml::from_str(
            r#"
[api]
endpoint = "https://api.sys.example.com"
token = "bearer abc"
timeout_secs = 5

[report]
max_pages = 50
output = "json"

[host]
refresh_token = false
"#,
        )
        .expect("parse");

        let mut cfg = EffectiveConfig::default();
        apply_raw_config(&mut cfg, raw);

        assert_eq!(cfg.api.endpoint.as_deref(), Some("https://api.sys.example.com"));
        assert!(cfg.api.token_set);
        assert_eq!(cfg.api.timeout_secs, 5);
        assert_eq!(cfg.report.max_pages, 50);
        assert_eq!(cfg.report.output, OutputFormat::Json);
        assert!(!cfg.host.refresh_token);
        assert_eq!(cfg.host.cf_command, "cf");
    }

    #[test]
    fn token_is_never_serialized() {
        let mut cfg = EffectiveConfig::default();
        cfg.api.token = Some("bearer secret".to_string());
        cfg.api.token_set = true;
        let s = serde_json::to_string(&cfg).expect("serialize");
        assert!(!s.contains("secret"));
        assert!(s.contains("\"token_set\":true"));
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(toml::from_str::<RawConfig>("[ui]\ncolor = true\n").is_err());
    }
}
