//! Diagnostic output on stderr. stdout carries only the report.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive for the run: `warn` when quiet, else `RUST_LOG`, else
/// the configured level.
pub fn filter_directive(configured_level: &str, quiet: bool) -> String {
    if quiet {
        return "warn".to_string();
    }
    std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| configured_level.to_string())
}

pub fn init_logging(configured_level: &str, quiet: bool) {
    let filter = EnvFilter::try_new(filter_directive(configured_level, quiet))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_forces_warn() {
        assert_eq!(filter_directive("debug", true), "warn");
    }
}
