//! Common types shared across CLI commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use steward_hooks::Engine;
use steward_plugins::actions::{CORE_READY, CORE_ROOT_READY};

/// Runtime state handed to every command
///
/// Construction performs the startup sequence: plugin and configuration
/// callbacks are registered, then `core:ready` and `core:root:ready` fire.
pub struct RuntimeContext {
    engine: Engine,
    root: PathBuf,
    plugins_root: PathBuf,
}

impl RuntimeContext {
    /// Start a fresh engine for the given project root
    ///
    /// # Errors
    ///
    /// Returns an error if a startup callback fails, for example when the
    /// configuration file cannot be parsed.
    pub fn start(root: impl Into<PathBuf>, plugins_root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let plugins_root = plugins_root.into();
        let engine = Engine::new();

        steward_plugins::register(&engine, &plugins_root);
        steward_config::config::register(&engine);

        CORE_READY
            .run(&engine, &())
            .context("Failed to install plugins")?;
        CORE_ROOT_READY
            .run(&engine, &root)
            .with_context(|| format!("Failed to load project at {}", root.display()))?;

        tracing::debug!(root = %root.display(), plugins_root = %plugins_root.display(), "Engine started");

        Ok(Self {
            engine,
            root,
            plugins_root,
        })
    }

    /// Hook engine
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Project root holding `config.toml`
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder scanned for plugin manifests
    #[must_use]
    pub fn plugins_root(&self) -> &Path {
        &self.plugins_root
    }
}

impl std::fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("root", &self.root)
            .field("plugins_root", &self.plugins_root)
            .finish_non_exhaustive()
    }
}
