//! Names of every action, filter and context used across steward
//!
//! These names are a public contract: plugins register against them, so
//! renaming one breaks every plugin that uses it. Each hook documents the
//! arguments its callbacks receive.

/// `(key, value)` configuration entries contributed by plugins
pub type ConfigItems = Vec<(String, toml::Value)>;

/// Actions, run for their side effects
pub mod actions {
    use std::path::PathBuf;

    use steward_hooks::{Action, ActionTemplate};

    /// Called once the core is ready to run; plugins are installed here.
    ///
    /// No arguments.
    pub const CORE_READY: Action = Action::new("core:ready");

    /// Called as soon as the project root is known.
    ///
    /// Argument: absolute path of the project root.
    pub const CORE_ROOT_READY: Action<PathBuf> = Action::new("core:root:ready");

    /// Enable one plugin. Only installed plugins can be enabled (see
    /// [`INSTALL_PLUGINS`]). Runs inside the `app:<name>` context, so every hook
    /// registered by its callbacks is removed when the plugin is disabled.
    ///
    /// No arguments.
    pub const ENABLE_PLUGIN: ActionTemplate = ActionTemplate::new("plugins:enable:{0}");

    /// Detect installable plugins. Manifest files in the plugins root are
    /// discovered by a built-in callback.
    ///
    /// No arguments.
    pub const INSTALL_PLUGINS: Action = Action::new("plugins:install");
}

/// Filters, folding values or building lists
pub mod filters {
    use std::path::PathBuf;

    use steward_hooks::{Filter, FilterTemplate};

    use super::ConfigItems;

    /// Settings that must be saved in the user `config.toml`.
    ///
    /// Items: `(key, value)`; keys should be prefixed with the plugin name.
    pub const CONFIG_BASE: Filter<ConfigItems> = Filter::new("config:base");

    /// Default settings that are only saved once the user changes them.
    ///
    /// Items: `(key, value)`.
    pub const CONFIG_DEFAULTS: Filter<ConfigItems> = Filter::new("config:defaults");

    /// Replacement values for settings declared by the core or other plugins.
    /// Overridden keys are removed from the user configuration when the
    /// plugin is disabled.
    ///
    /// Items: `(key, value)`.
    pub const CONFIG_OVERRIDES: Filter<ConfigItems> = Filter::new("config:overrides");

    /// Contents inserted at one named patch location.
    ///
    /// Items: unrendered patch content. Most plugins use [`ENV_PATCHES`] instead.
    pub const ENV_PATCH: FilterTemplate<Vec<String>> = FilterTemplate::new("env:patches:{0}");

    /// Patches as `(name, content)` pairs, moved into [`ENV_PATCH`] once
    /// plugins are enabled.
    pub const ENV_PATCHES: Filter<Vec<(String, String)>> = Filter::new("env:patches");

    /// Folders containing templates.
    ///
    /// Items: absolute paths.
    pub const ENV_TEMPLATE_ROOTS: Filter<Vec<PathBuf>> = Filter::new("env:templates:roots");

    /// Template targets.
    ///
    /// Items: `(source, destination)`, the source relative to a template root and
    /// the destination relative to the environment root.
    pub const ENV_TEMPLATE_TARGETS: Filter<Vec<(String, String)>> =
        Filter::new("env:templates:targets");

    /// Extra variables available to every template.
    ///
    /// Items: `(name, value)`.
    pub const ENV_TEMPLATE_VARIABLES: Filter<ConfigItems> =
        Filter::new("env:templates:variables");

    /// Installed plugin names, duplicates included.
    pub const PLUGINS_INSTALLED: Filter<Vec<String>> = Filter::new("plugins:installed");

    /// One line of information per installed plugin.
    ///
    /// Items: `(plugin, info)`, where info is the version or the manifest path.
    pub const PLUGINS_INFO: Filter<Vec<(String, String)>> =
        Filter::new("plugins:installed:versions");

    /// Enabled plugin names.
    pub const PLUGINS_ENABLED: Filter<Vec<String>> = Filter::new("plugins:enabled");
}

/// Contexts tracking who registered which hooks
pub mod contexts {
    use steward_hooks::{ContextName, ContextTemplate};

    /// Everything a plugin registers while being enabled lives in `app:<name>`.
    pub const APP: ContextTemplate = ContextTemplate::new("app:{0}");

    /// Plugins are installed and enabled within this context.
    pub const PLUGINS: ContextName = ContextName::from_static("plugins");

    /// Manifest-file plugins are installed within this context.
    pub const PLUGINS_MANIFEST: ContextName = ContextName::from_static("plugins:manifest");
}
