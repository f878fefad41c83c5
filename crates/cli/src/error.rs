//! Error types for CLI commands

use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// Hook, plugin or configuration failure
    #[error(transparent)]
    Steward(#[from] steward_core::Error),

    /// Setting is not present in the configuration
    #[error("Missing configuration value: {0}")]
    KeyNotFound(String),

    /// `--set` argument is not of the form `KEY=VALUE`
    #[error("Invalid setting '{0}': expected KEY=VALUE")]
    InvalidSetting(String),

    /// JSON output could not be produced
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;

impl CommandError {
    /// Create a `KeyNotFound` error
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound(key.into())
    }

    /// Create an `InvalidSetting` error
    pub fn invalid_setting(raw: impl Into<String>) -> Self {
        Self::InvalidSetting(raw.into())
    }
}
