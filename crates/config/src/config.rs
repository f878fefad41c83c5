//! Configuration management
//!
//! The configuration of a project is an ordered map of settings, merged from
//! three layers:
//!
//! 1. the user file `<root>/config.toml`, plus `STEWARD_<KEY>` environment
//!    overrides;
//! 2. the base settings: [`CONFIG_BASE`] then [`CONFIG_OVERRIDES`] from
//!    enabled plugins;
//! 3. the defaults: an empty [`PLUGINS_CONFIG_KEY`] list, then
//!    [`CONFIG_DEFAULTS`] from enabled plugins.
//!
//! A layer only fills keys that the layers above it left unset.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use steward_hooks::{Engine, sorted_unique};
use steward_plugins::actions::CORE_ROOT_READY;
use steward_plugins::contexts::APP;
use steward_plugins::filters::{CONFIG_BASE, CONFIG_DEFAULTS, CONFIG_OVERRIDES};

use crate::{Error, Result};

/// Settings, in file order
pub type Config = IndexMap<String, toml::Value>;

/// Name of the user configuration file inside the project root
pub const CONFIG_FILENAME: &str = "config.toml";

/// Key listing the enabled plugins
pub const PLUGINS_CONFIG_KEY: &str = "PLUGINS";

/// Prefix of environment variables overriding settings
pub const ENV_PREFIX: &str = "STEWARD_";

/// Priority of the startup callback enabling configured plugins
///
/// Plugins must be installed first, and enabled before their patches are
/// collected at [`steward_hooks::priority::LOW`].
pub const ENABLE_PLUGINS_PRIORITY: i32 = 20;

/// Path of the user configuration file
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILENAME)
}

/// Load the full configuration: user, base and defaults
///
/// Fails if the project has no configuration file yet.
pub fn load(engine: &Engine, root: &Path) -> Result<Config> {
    let path = config_path(root);
    if !path.exists() {
        return Err(Error::Config(format!(
            "Project root {} has no {CONFIG_FILENAME}; run `steward config save` first",
            root.display()
        )));
    }
    load_full(engine, root)
}

/// Load user, base and defaults, whether or not the user file exists
pub fn load_full(engine: &Engine, root: &Path) -> Result<Config> {
    let mut config = load_minimal(engine, root)?;
    let defaults = get_defaults(engine)?;
    merge(&mut config, &defaults);
    Ok(config)
}

/// Load the user configuration completed with base settings only
pub fn load_minimal(engine: &Engine, root: &Path) -> Result<Config> {
    let mut config = get_user(root)?;
    let base = get_base(engine)?;
    merge(&mut config, &base);
    Ok(config)
}

/// Settings saved in the user file, with environment overrides applied
pub fn get_user(root: &Path) -> Result<Config> {
    let path = config_path(root);
    let mut config = if path.exists() {
        read_file(&path)?
    } else {
        Config::new()
    };
    apply_env_overrides(&mut config, std::env::vars());
    Ok(config)
}

/// Base settings: plugin base settings, then plugin overrides
pub fn get_base(engine: &Engine) -> Result<Config> {
    let mut base = Config::new();

    let extra = CONFIG_BASE.apply(engine, Vec::new(), &())?;
    let extra = CONFIG_OVERRIDES.apply(engine, extra, &())?;
    for (name, value) in extra {
        if let Some(existing) = base.get(&name) {
            tracing::warn!(
                setting = %name,
                value = %value,
                existing = %existing,
                "Found conflicting values for setting"
            );
        }
        base.insert(name, value);
    }
    Ok(base)
}

/// Default settings: an empty plugin list plus plugin defaults
pub fn get_defaults(engine: &Engine) -> Result<Config> {
    let mut defaults = Config::new();
    defaults.insert(
        PLUGINS_CONFIG_KEY.to_string(),
        toml::Value::Array(Vec::new()),
    );

    for item in CONFIG_DEFAULTS.iterate(engine, &()) {
        let (name, value) = item?;
        defaults.insert(name, value);
    }
    apply_env_overrides(&mut defaults, std::env::vars());
    Ok(defaults)
}

/// Add the entries of `base` that `config` does not define
pub fn merge(config: &mut Config, base: &Config) {
    for (key, value) in base {
        if !config.contains_key(key) {
            config.insert(key.clone(), value.clone());
        }
    }
}

/// Replace settings that have a `STEWARD_<KEY>` variable
///
/// Values are parsed as TOML (`8080`, `true`, `["a", "b"]`) and kept as
/// plain strings when they do not parse.
pub fn apply_env_overrides<I>(config: &mut Config, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: IndexMap<String, String> = vars.into_iter().collect();
    for (key, value) in config.iter_mut() {
        if let Some(raw) = vars.get(&format!("{ENV_PREFIX}{key}")) {
            tracing::debug!(setting = %key, "Setting overridden from environment");
            *value = parse_value(raw);
        }
    }
}

/// Parse one TOML value, falling back to a string
pub fn parse_value(raw: &str) -> toml::Value {
    toml::from_str::<toml::Table>(&format!("value = {raw}"))
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}

/// Read a setting as `T`, or `default` when unset
pub fn get_typed<T: DeserializeOwned>(config: &Config, key: &str, default: T) -> Result<T> {
    match config.get(key) {
        Some(value) => value.clone().try_into().map_err(|e| {
            Error::Config(format!("Invalid value for setting '{key}': {e}"))
        }),
        None => Ok(default),
    }
}

/// Write the user configuration file
pub fn save(root: &Path, config: &Config) -> Result<()> {
    let path = config_path(root);
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            Error::Config(format!(
                "Failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    fs::write(&path, content).map_err(|e| {
        Error::Config(format!(
            "Failed to write config file {}: {e}",
            path.display()
        ))
    })?;

    tracing::info!(path = %path.display(), "Configuration saved");
    Ok(())
}

fn read_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {e}",
            path.display()
        ))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}

/// Enable every installed plugin listed under [`PLUGINS_CONFIG_KEY`]
///
/// Plugins that are not installed are ignored; plugins that fail to enable
/// are logged and skipped.
pub fn enable_plugins(engine: &Engine, config: &Config) -> Result<()> {
    let names: Vec<String> = get_typed(config, PLUGINS_CONFIG_KEY, Vec::new())?;
    let installed: BTreeSet<String> = steward_plugins::iter_installed(engine)?
        .into_iter()
        .collect();

    for name in sorted_unique(names) {
        if !installed.contains(&name) {
            tracing::debug!(plugin = %name, "Configured plugin is not installed");
            continue;
        }
        if let Err(e) = steward_plugins::enable(engine, &name) {
            tracing::warn!(plugin = %name, error = %e, "Failed to enable plugin");
        }
    }
    Ok(())
}

/// Store the enabled plugins, deduplicated and sorted, in the configuration
pub fn save_enabled_plugins(engine: &Engine, config: &mut Config) -> Result<()> {
    let enabled = steward_plugins::iter_enabled(engine)?
        .into_iter()
        .map(toml::Value::String)
        .collect();
    config.insert(PLUGINS_CONFIG_KEY.to_string(), toml::Value::Array(enabled));
    Ok(())
}

/// Disable a plugin and remove the settings it overrode
///
/// Returns the removed `(key, value)` entries, so users can back them up.
pub fn disable_plugin(
    engine: &Engine,
    config: &mut Config,
    plugin: &str,
) -> Result<Vec<(String, toml::Value)>> {
    let context = engine.context_name(&APP, plugin)?;

    let mut removed = Vec::new();
    for item in CONFIG_OVERRIDES.iterate_in_context(engine, context.as_str(), &()) {
        let (key, _) = item?;
        if let Some(value) = config.shift_remove(&key) {
            tracing::info!(plugin, setting = %key, value = %value, "Removing overridden setting");
            removed.push((key, value));
        }
    }

    steward_plugins::disable(engine, plugin)?;
    save_enabled_plugins(engine, config)?;
    Ok(removed)
}

/// Enable the configured plugins once the project root is known
pub fn register(engine: &Engine) {
    CORE_ROOT_READY.add_with_priority(engine, ENABLE_PLUGINS_PRIORITY, |engine, root| {
        let config = load_minimal(engine, root)?;
        enable_plugins(engine, &config)?;
        Ok(())
    });
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use steward_plugins::Manifest;
    use tempfile::TempDir;

    fn install(engine: &Engine, name: &str, toml: &str) {
        let path = PathBuf::from(format!("/plugins/{name}.toml"));
        let manifest = Manifest::parse(toml, &path).unwrap();
        steward_plugins::install_manifest(engine, manifest).unwrap();
    }

    fn settings(pairs: &[(&str, toml::Value)]) -> Config {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_merge_fills_missing_keys_only() {
        let mut config = settings(&[("A", toml::Value::Integer(1))]);
        let base = settings(&[
            ("A", toml::Value::Integer(2)),
            ("B", toml::Value::Integer(3)),
        ]);
        merge(&mut config, &base);
        assert_eq!(config["A"], toml::Value::Integer(1));
        assert_eq!(config["B"], toml::Value::Integer(3));
    }

    #[test]
    fn test_env_overrides_existing_keys() {
        let mut config = settings(&[
            ("PORT", toml::Value::Integer(80)),
            ("NAME", toml::Value::String("web".into())),
        ]);
        let vars = vec![
            ("STEWARD_PORT".to_string(), "8080".to_string()),
            ("STEWARD_NAME".to_string(), "not toml".to_string()),
            ("STEWARD_UNKNOWN".to_string(), "1".to_string()),
        ];
        apply_env_overrides(&mut config, vars);

        assert_eq!(config["PORT"], toml::Value::Integer(8080));
        assert_eq!(config["NAME"], toml::Value::String("not toml".into()));
        assert!(!config.contains_key("UNKNOWN"));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("true"), toml::Value::Boolean(true));
        assert_eq!(
            parse_value(r#"["a"]"#),
            toml::Value::Array(vec![toml::Value::String("a".into())])
        );
        assert_eq!(parse_value("plain"), toml::Value::String("plain".into()));
    }

    #[test]
    fn test_get_typed() {
        let config = settings(&[("PORT", toml::Value::Integer(80))]);
        assert_eq!(get_typed::<i64>(&config, "PORT", 0).unwrap(), 80);
        assert_eq!(get_typed::<i64>(&config, "MISSING", 7).unwrap(), 7);
        assert!(get_typed::<String>(&config, "PORT", String::new()).is_err());
    }

    #[test]
    fn test_layers_without_plugins() {
        let engine = Engine::new();
        assert!(get_base(&engine).unwrap().is_empty());

        let defaults = get_defaults(&engine).unwrap();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[PLUGINS_CONFIG_KEY], toml::Value::Array(Vec::new()));
    }

    #[test]
    fn test_save_and_load_preserves_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("project");
        let config = settings(&[
            ("Z", toml::Value::Integer(1)),
            ("A", toml::Value::Integer(2)),
        ]);
        save(&root, &config).unwrap();

        let engine = Engine::new();
        let loaded = load(&engine, &root).unwrap();
        let keys: Vec<_> = loaded.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Z", "A", PLUGINS_CONFIG_KEY]);
    }

    #[test]
    fn test_load_requires_config_file() {
        let temp = TempDir::new().unwrap();
        let engine = Engine::new();
        assert!(matches!(load(&engine, temp.path()), Err(Error::Config(_))));
        assert!(load_full(&engine, temp.path()).is_ok());
    }

    #[test]
    fn test_invalid_config_file() {
        let temp = TempDir::new().unwrap();
        fs::write(config_path(temp.path()), "KEY = [").unwrap();
        let err = get_user(temp.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_plugin_layers() {
        let engine = Engine::new();
        install(
            &engine,
            "p1",
            r#"
[config.base]
P1_SECRET = "s"
LANGUAGE = "en"

[config.defaults]
P1_PORT = 8000

[config.overrides]
LANGUAGE = "fr"
"#,
        );
        steward_plugins::enable(&engine, "p1").unwrap();

        let temp = TempDir::new().unwrap();
        save(temp.path(), &settings(&[("P1_PORT", toml::Value::Integer(9000))])).unwrap();

        let config = load(&engine, temp.path()).unwrap();
        assert_eq!(config["P1_SECRET"], toml::Value::String("s".into()));
        assert_eq!(config["LANGUAGE"], toml::Value::String("fr".into()));
        assert_eq!(config["P1_PORT"], toml::Value::Integer(9000));

        let minimal = load_minimal(&engine, temp.path()).unwrap();
        assert!(!minimal.contains_key(PLUGINS_CONFIG_KEY));
    }

    #[test]
    fn test_enable_plugins_skips_unknown() {
        let engine = Engine::new();
        install(&engine, "p1", "");
        let config = settings(&[(
            PLUGINS_CONFIG_KEY,
            toml::Value::Array(vec![
                toml::Value::String("p1".into()),
                toml::Value::String("ghost".into()),
                toml::Value::String("p1".into()),
            ]),
        )]);

        enable_plugins(&engine, &config).unwrap();
        assert_eq!(steward_plugins::iter_enabled(&engine).unwrap(), ["p1"]);

        let mut saved = Config::new();
        save_enabled_plugins(&engine, &mut saved).unwrap();
        assert_eq!(
            saved[PLUGINS_CONFIG_KEY],
            toml::Value::Array(vec![toml::Value::String("p1".into())])
        );
    }

    #[test]
    fn test_enable_plugins_rejects_non_list() {
        let engine = Engine::new();
        let config = settings(&[(PLUGINS_CONFIG_KEY, toml::Value::Integer(1))]);
        assert!(enable_plugins(&engine, &config).is_err());
    }

    #[test]
    fn test_disable_plugin_removes_overridden_settings() {
        let engine = Engine::new();
        install(&engine, "p1", "[config.overrides]\nLANGUAGE = \"fr\"\n");
        install(&engine, "p2", "[config.overrides]\nTHEME = \"dark\"\n");
        steward_plugins::enable(&engine, "p1").unwrap();
        steward_plugins::enable(&engine, "p2").unwrap();

        let mut config = settings(&[
            ("LANGUAGE", toml::Value::String("fr".into())),
            ("THEME", toml::Value::String("dark".into())),
        ]);
        let removed = disable_plugin(&engine, &mut config, "p1").unwrap();

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].0, "LANGUAGE");
        assert!(!config.contains_key("LANGUAGE"));
        assert!(config.contains_key("THEME"));
        assert_eq!(
            config[PLUGINS_CONFIG_KEY],
            toml::Value::Array(vec![toml::Value::String("p2".into())])
        );
    }

    #[test]
    fn test_register_enables_configured_plugins() {
        let engine = Engine::new();
        install(&engine, "p1", "");
        register(&engine);

        let temp = TempDir::new().unwrap();
        let config = settings(&[(
            PLUGINS_CONFIG_KEY,
            toml::Value::Array(vec![toml::Value::String("p1".into())]),
        )]);
        save(temp.path(), &config).unwrap();

        CORE_ROOT_READY
            .run(&engine, &temp.path().to_path_buf())
            .unwrap();
        assert!(steward_plugins::is_enabled(&engine, "p1").unwrap());
    }
}
