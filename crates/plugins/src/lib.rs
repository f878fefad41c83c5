//! # Steward Plugins
//!
//! Plugin layer built on the hook engine:
//!
//! - **Catalog**: the names of every action, filter and context, with the
//!   arguments their callbacks receive
//! - **Manifests**: plugins declared as TOML files in the plugins root
//! - **Lifecycle**: install, enable, disable and list plugins

pub mod catalog;
pub mod lifecycle;
pub mod manifest;

pub use catalog::{ConfigItems, actions, contexts, filters};
pub use lifecycle::{
    disable, enable, install_all, install_patches, is_enabled, is_installed, iter_enabled,
    is_template_path, iter_info, iter_installed, iter_patches, iter_template_roots,
    iter_template_targets, register,
};
pub use manifest::{Manifest, ManifestConfig, discover, install_from_root, install_manifest};
