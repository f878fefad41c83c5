//! Configuration management for steward
//!
//! This crate handles:
//! - Configuration loading, merging and saving
//! - Enabling the plugins listed in the configuration
//! - XDG directory management
//! - Logging initialization

pub mod config;
pub mod dirs;
pub mod logging;

// Re-export error types from core
pub use steward_core::{Error, Result};

// Re-export main types
pub use config::{
    CONFIG_FILENAME, Config, ENABLE_PLUGINS_PRIORITY, PLUGINS_CONFIG_KEY, disable_plugin,
    enable_plugins, get_typed, load, load_full, load_minimal, merge, save, save_enabled_plugins,
};
pub use dirs::{data_dir, default_plugins_root, default_root};
