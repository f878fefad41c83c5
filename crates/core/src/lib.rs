//! Core types for steward
//!
//! This is the foundation crate (Layer 0) that all other steward crates depend on.
//! It provides the base error type shared by the hook engine, the plugin layer
//! and the configuration loader.
//!
//! This crate has no dependencies on other steward crates.

pub mod error;

pub use error::{BoxError, Error, Result};
