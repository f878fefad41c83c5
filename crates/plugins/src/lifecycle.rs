//! Installing, enabling and disabling plugins
//!
//! A plugin is first *installed* (known to the engine, listed by
//! [`iter_installed`]) and then *enabled* (its hooks registered). Enabling
//! runs inside the `plugins` and `app:<name>` contexts, so [`disable`] can
//! remove everything the plugin registered.

use std::path::{Path, PathBuf};

use steward_core::{Error, Result};
use steward_hooks::{Engine, priority, sorted_by_first, try_sorted_by_first, try_sorted_unique};

use crate::catalog::{actions, contexts, filters};
use crate::manifest;

/// Wire the plugin machinery into the engine
///
/// - [`actions::CORE_READY`]: install every plugin
/// - [`actions::INSTALL_PLUGINS`]: discover manifests in `plugins_root`
/// - [`actions::CORE_ROOT_READY`] (low priority): move [`filters::ENV_PATCHES`]
///   into [`filters::ENV_PATCH`], after plugins are enabled
pub fn register(engine: &Engine, plugins_root: impl Into<PathBuf>) {
    let plugins_root = plugins_root.into();

    actions::CORE_READY.add(engine, |engine, ()| {
        install_all(engine)?;
        Ok(())
    });
    actions::INSTALL_PLUGINS.add(engine, move |engine, ()| {
        manifest::install_from_root(engine, &plugins_root)?;
        Ok(())
    });
    actions::CORE_ROOT_READY.add_with_priority(engine, priority::LOW, |engine, _root| {
        install_patches(engine)?;
        Ok(())
    });
}

/// Find every installable plugin
///
/// Must run once before plugins can be enabled.
pub fn install_all(engine: &Engine) -> Result<()> {
    let _guard = engine.enter(contexts::PLUGINS);
    actions::INSTALL_PLUGINS.run(engine, &())
}

/// Convert `(name, content)` items of [`filters::ENV_PATCHES`] into
/// [`filters::ENV_PATCH`] items
///
/// Each converted item is owned by the context that contributed the original,
/// so disabling a plugin also removes its patches.
pub fn install_patches(engine: &Engine) -> Result<()> {
    let mut patches = filters::ENV_PATCHES.iterate(engine, &());
    while let Some(item) = patches.next() {
        let (name, content) = item?;
        filters::ENV_PATCH.get(engine, &name)?.add_item_in_context(
            engine,
            priority::DEFAULT,
            patches.owner().cloned(),
            content,
        );
    }
    Ok(())
}

/// Whether a plugin with this name was installed
pub fn is_installed(engine: &Engine, name: &str) -> Result<bool> {
    for plugin in filters::PLUGINS_INSTALLED.iterate(engine, &()) {
        if plugin? == name {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Installed plugin names, sorted
///
/// Plugins installed twice under the same name are listed twice.
pub fn iter_installed(engine: &Engine) -> Result<Vec<String>> {
    let mut plugins = filters::PLUGINS_INSTALLED
        .iterate(engine, &())
        .collect::<Result<Vec<_>>>()?;
    plugins.sort();
    Ok(plugins)
}

/// `(name, info)` of every installed plugin, sorted by name
pub fn iter_info(engine: &Engine) -> Result<Vec<(String, String)>> {
    try_sorted_by_first(filters::PLUGINS_INFO.iterate(engine, &()))
}

/// Enable an installed plugin
pub fn enable(engine: &Engine, name: &str) -> Result<()> {
    if !is_installed(engine, name)? {
        return Err(Error::PluginNotInstalled(name.to_string()));
    }

    let app = engine.context_name(&contexts::APP, name)?;
    let _plugins = engine.enter(contexts::PLUGINS);
    let _app = engine.enter(app);
    actions::ENABLE_PLUGIN.get(engine, name)?.run(engine, &())?;

    tracing::debug!(plugin = name, "Plugin enabled");
    Ok(())
}

/// Remove every action and filter a plugin registered while enabled
pub fn disable(engine: &Engine, name: &str) -> Result<usize> {
    let app = engine.context_name(&contexts::APP, name)?;
    let removed = engine.clear_all(app.as_str());
    tracing::debug!(plugin = name, removed, "Plugin disabled");
    Ok(removed)
}

/// Whether a plugin is currently enabled
pub fn is_enabled(engine: &Engine, name: &str) -> Result<bool> {
    for plugin in filters::PLUGINS_ENABLED.iterate(engine, &()) {
        if plugin? == name {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Enabled plugin names, sorted and deduplicated
pub fn iter_enabled(engine: &Engine) -> Result<Vec<String>> {
    try_sorted_unique(filters::PLUGINS_ENABLED.iterate(engine, &()))
}

/// Contents of one patch, in priority order
pub fn iter_patches(engine: &Engine, name: &str) -> Result<Vec<String>> {
    filters::ENV_PATCH
        .get(engine, name)?
        .iterate(engine, &())
        .collect()
}

/// Template folders contributed by enabled plugins
pub fn iter_template_roots(engine: &Engine) -> Result<Vec<PathBuf>> {
    filters::ENV_TEMPLATE_ROOTS.iterate(engine, &()).collect()
}

/// `(source, destination)` template targets, sorted by source
pub fn iter_template_targets(engine: &Engine) -> Result<Vec<(String, String)>> {
    let targets = filters::ENV_TEMPLATE_TARGETS
        .iterate(engine, &())
        .collect::<Result<Vec<_>>>()?;
    Ok(sorted_by_first(targets))
}

/// Whether `path` is inside one of the template roots
pub fn is_template_path(engine: &Engine, path: &Path) -> Result<bool> {
    Ok(iter_template_roots(engine)?
        .iter()
        .any(|root| path.starts_with(root)))
}
