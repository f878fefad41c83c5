//! Logging configuration for the steward CLI
//!
//! Compact terminal output plus optional file logging, using tracing.

use std::path::Path;

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{Error, Result};

/// Crates whose events are shown by default
const TARGETS: [&str; 5] = [
    "steward",
    "steward_config",
    "steward_core",
    "steward_hooks",
    "steward_plugins",
];

/// Default filter directives for a log level
fn default_directives(level: &str) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the logging system
///
/// # Arguments
/// * `verbose` - Enable debug level logging and timestamps
/// * `log_file` - Optional path to append detailed logs to
///
/// # Examples
/// ```ignore
/// // Basic usage with info level
/// init(false, None)?;
///
/// // Write debug logs to a file
/// init(true, Some(Path::new("steward.log")))?;
/// ```
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    // RUST_LOG overrides the default directives
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(level)))
        .map_err(|e| Error::Message(format!("Invalid log filter: {e}")))?;

    let file_layer = match log_file {
        Some(log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            let file_filter = EnvFilter::try_new(default_directives("debug"))
                .map_err(|e| Error::Message(format!("Invalid log filter: {e}")))?;

            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_ansi(true);

    let registry = tracing_subscriber::registry().with(file_layer);
    let result = if verbose {
        registry
            .with(stdout_layer.with_filter(env_filter))
            .try_init()
    } else {
        // No timestamps in normal mode
        registry
            .with(stdout_layer.without_time().with_filter(env_filter))
            .try_init()
    };

    result.map_err(|e| Error::Message(format!("Failed to initialize logging: {e}")))
}
