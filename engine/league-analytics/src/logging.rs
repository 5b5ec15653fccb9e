//! Logging and tracing setup

use crate::config::LoggingConfig;
use crate::error::{AnalyticsError, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, prelude::*, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with a filter directive and an output format
/// (`plain`, `pretty` or `json`). Logs go to stderr.
pub fn initialize_logging_with_config(level: &str, format: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(level)
        .map_err(|e| AnalyticsError::InvalidConfig(format!("invalid log level '{level}': {e}")))?;

    let fmt_layer = match format {
        "json" => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .boxed(),
        "pretty" => fmt::layer()
            .pretty()
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .boxed(),
        _ => fmt::layer().with_target(false).with_writer(std::io::stderr).with_ansi(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AnalyticsError::InvalidConfig(format!("logging already initialized: {e}")))
}

pub fn initialize_from_config(config: &LoggingConfig) -> Result<()> {
    initialize_logging_with_config(&config.level, &config.format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_filter() {
        let result = initialize_logging_with_config("league_analytics=notalevel", "plain");
        assert!(matches!(result, Err(AnalyticsError::InvalidConfig(_))));
    }
}
