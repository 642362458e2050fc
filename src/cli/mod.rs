use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing::info;

use crate::api::{CfClient, ClientOptions};
use crate::config::{EffectiveConfig, OutputFormat};
use crate::core::ReportRow;
use crate::engine::{Engine, EngineOptions};

#[derive(Debug, Parser)]
#[command(
    name = "report-buildpacks",
    version,
    about = "Report the buildpacks staged into every application and flag the ones needing attention"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// API endpoint, e.g. https://api.sys.example.com
    #[arg(long, global = true)]
    pub api: Option<String>,
    #[arg(long = "skip-ssl-validation", global = true)]
    pub skip_ssl_validation: bool,
    /// HTTP and cf CLI timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report all buildpacks used in the installation
    ReportBuildpacks(ReportArgs),
    Config(ConfigArgs),
    Completion(CompletionArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Send JSON to stdout instead of a rendered table
    #[arg(long = "output-json")]
    pub output_json: bool,
    /// Suppress progress messages on stderr
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
    /// Print JSON instead of TOML
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let home_dir = crate::platform::home_dir().map_err(crate::exit::invalid_args_err)?;
    let env_config_path = std::env::var_os("REPORT_BUILDPACKS_CONFIG").map(PathBuf::from);
    let mut cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        &home_dir,
    )
    .map_err(crate::exit::invalid_args_err)?;
    apply_cli_overrides(&mut cfg, &cli)?;

    match cli.command {
        Commands::ReportBuildpacks(args) => {
            let quiet = args.quiet;
            crate::logging::init_logging(&cfg.log.level, quiet);

            let session = crate::host::resolve(&cfg, &home_dir)?;
            let client = CfClient::new(ClientOptions {
                api_endpoint: session.api_endpoint,
                authorization: session.authorization,
                skip_ssl_validation: session.skip_ssl_validation,
                timeout: Duration::from_secs(cfg.api.timeout_secs),
                quiet,
            })?;

            let engine = Engine::new(
                &client,
                EngineOptions {
                    max_pages: cfg.report.max_pages,
                    quiet,
                },
            );
            let rows = engine.report()?;
            if !quiet {
                let flagged = rows.iter().filter(|r| r.needs_attention()).count();
                info!("{} application(s), {flagged} needing attention", rows.len());
            }

            let format = if args.output_json {
                OutputFormat::Json
            } else {
                cfg.report.output
            };
            write_report(&rows, format)?;
        }
        Commands::Config(args) => {
            if args.show {
                let rendered = if args.json {
                    let mut s = serde_json::to_string_pretty(&cfg)?;
                    s.push('\n');
                    s
                } else {
                    toml::to_string_pretty(&cfg)?
                };
                write_stdout(rendered.as_bytes())?;
            } else {
                eprintln!("config: use `report-buildpacks config --show`");
            }
        }
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "report-buildpacks", &mut out);
        }
    }

    Ok(())
}

fn apply_cli_overrides(cfg: &mut EffectiveConfig, cli: &Cli) -> Result<()> {
    if let Some(api) = cli.api.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        cfg.api.endpoint = Some(api.to_string());
    }
    if cli.skip_ssl_validation {
        cfg.api.skip_ssl_validation = Some(true);
    }
    if let Some(timeout) = cli.timeout {
        if timeout == 0 {
            return Err(crate::exit::invalid_args(
                "--timeout must be greater than 0",
            ));
        }
        cfg.api.timeout_secs = timeout;
    }
    Ok(())
}

fn write_report(rows: &[ReportRow], format: OutputFormat) -> Result<()> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Json => crate::ui::render_json(&mut buf, rows)?,
        OutputFormat::Table => crate::ui::render_table(&mut buf, rows)?,
    }

    write_stdout(&buf)
}

/// A reader that went away (`| head`) is not an error.
fn write_stdout(buf: &[u8]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(buf).and_then(|()| stdout.flush()) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        "powershell" => Ok(clap_complete::Shell::PowerShell),
        "elvish" => Ok(clap_complete::Shell::Elvish),
        other => Err(crate::exit::invalid_args(format!(
            "unsupported shell: {other} (expected bash|zsh|fish|powershell|elvish)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_subcommand_flags_parse() {
        let cli = Cli::try_parse_from([
            "report-buildpacks",
            "report-buildpacks",
            "--output-json",
            "--quiet",
        ])
        .expect("parse");
        match cli.command {
            Commands::ReportBuildpacks(args) => {
                assert!(args.output_json);
                assert!(args.quiet);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "report-buildpacks",
            "report-buildpacks",
            "--api",
            "https://api.example.com",
            "--skip-ssl-validation",
            "--timeout",
            "7",
        ])
        .expect("parse");

        let mut cfg = EffectiveConfig::default();
        apply_cli_overrides(&mut cfg, &cli).expect("apply");
        assert_eq!(cfg.api.endpoint.as_deref(), Some("https://api.example.com"));
        assert_eq!(cfg.api.skip_ssl_validation, Some(true));
        assert_eq!(cfg.api.timeout_secs, 7);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cli = Cli::try_parse_from(["report-buildpacks", "--timeout", "0", "config"])
            .expect("parse");
        let mut cfg = EffectiveConfig::default();
        let err = apply_cli_overrides(&mut cfg, &cli).expect_err("should fail");
        assert_eq!(crate::exit::exit_code(&err), 2);
    }

    #[test]
    fn unknown_shell_is_invalid_args() {
        let err = parse_shell("tcsh").expect_err("should fail");
        assert_eq!(crate::exit::exit_code(&err), 2);
        assert!(parse_shell(" Zsh ").is_ok());
    }
}
