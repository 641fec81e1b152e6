//! Logging configuration and initialization.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::{warn, Level};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{PublisherError, Result};

/// Dependencies whose debug output drowns out our own.
const QUIET_TARGETS: &[&str] = &["aws_smithy_runtime=warn", "aws_config=warn", "hyper_util=warn"];

/// Parse a log level name.
///
/// Returns `None` for names outside the recognized set.
fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" | "critical" => Some(Level::ERROR),
        _ => None,
    }
}

fn build_filter(level: Level) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for target in QUIET_TARGETS {
        if let Ok(directive) = target.parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Initialize the logging system with the given configuration.
///
/// Logs go to stdout and, when configured, to a file as well. An
/// unrecognized level falls back to `info` and is reported as a warning.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let parsed = parse_level(&config.level);
    let filter = build_filter(parsed.unwrap_or(Level::INFO));

    let file_layer = match &config.file {
        Some(path) => {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
            let log_file = Arc::new(File::create(path)?);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(log_file)
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(file_layer)
        .with(filter)
        .try_init()
        .map_err(|e| PublisherError::Config(format!("failed to initialize logging: {e}")))?;

    if parsed.is_none() {
        warn!("Invalid logging level specified, ignoring: '{}'", config.level);
    }

    Ok(())
}

/// Initialize console-only logging at `info`.
///
/// Used when [`init`] fails, so errors still reach stdout.
pub fn init_console_only() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(build_filter(Level::INFO))
        .try_init();
}
