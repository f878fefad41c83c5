//! XDG directory utilities
//!
//! This module provides XDG-compliant directory paths for steward.
//! It follows the XDG Base Directory specification using the `xdg` crate:
//! - `XDG_DATA_HOME` defaults to ~/.local/share

use std::path::PathBuf;
use xdg::BaseDirectories;

/// Get the steward data directory
///
/// Returns `$XDG_DATA_HOME/steward` or `~/.local/share/steward`
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    // xdg 3.0: with_prefix returns BaseDirectories, get_*_home returns Option<PathBuf>
    BaseDirectories::with_prefix("steward").get_data_home()
}

/// Get the default project root
///
/// Returns `$XDG_DATA_HOME/steward` or `~/.local/share/steward`
#[must_use]
pub fn default_root() -> Option<PathBuf> {
    data_dir()
}

/// Get the default folder scanned for plugin manifests
///
/// Returns `$XDG_DATA_HOME/steward-plugins` or `~/.local/share/steward-plugins`.
/// It lives outside the project root so plugins are shared between projects.
#[must_use]
pub fn default_plugins_root() -> Option<PathBuf> {
    BaseDirectories::with_prefix("steward-plugins").get_data_home()
}
