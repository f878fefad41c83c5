//! Base error types for steward
//!
//! This module provides the foundation error types that all crates can use.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by hook callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Template hook or context name could not be instantiated
    #[error("Invalid template '{pattern}': {reason}")]
    InvalidTemplate {
        /// The offending pattern
        pattern: String,
        /// What is wrong with it
        reason: String,
    },

    /// A hook callback failed during dispatch
    #[error("Callback for hook '{hook}' failed: {source}")]
    Callback {
        /// Hook being dispatched
        hook: String,
        /// Error returned by the callback
        #[source]
        source: BoxError,
    },

    /// A hook was dispatched with a different signature than it was registered with
    #[error("Hook '{hook}' was registered with a different callback signature (expected {expected})")]
    SignatureMismatch {
        /// Hook being dispatched
        hook: String,
        /// Signature requested by the caller
        expected: &'static str,
    },

    /// Plugin is not installed
    #[error("Plugin '{0}' is not installed")]
    PluginNotInstalled(String),

    /// Plugin manifest could not be read or parsed
    #[error("Invalid plugin manifest {}: {message}", path.display())]
    Manifest {
        /// Manifest file
        path: PathBuf,
        /// Parse or validation failure
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Wrap a callback failure for the given hook
    pub fn callback(hook: impl Into<String>, source: BoxError) -> Self {
        Self::Callback {
            hook: hook.into(),
            source,
        }
    }

    /// Create an `InvalidTemplate` error
    pub fn invalid_template(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
