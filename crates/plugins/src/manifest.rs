//! Plugins declared as TOML manifest files
//!
//! Every `*.toml` file in the plugins root describes one plugin:
//!
//! ```toml
//! name = "myplugin"          # defaults to the file stem
//! version = "1.2.0"
//! templates = "templates"    # relative to the manifest
//!
//! [config.base]
//! MYPLUGIN_SECRET = "changeme"
//!
//! [config.defaults]
//! MYPLUGIN_PORT = 8080
//!
//! [config.overrides]
//! LANGUAGE = "fr"
//!
//! [patches]
//! nginx-extra = "location /myplugin { }"
//!
//! [variables]
//! MYPLUGIN_BANNER = "hello"
//!
//! [targets]
//! myplugin = "apps"
//! ```
//!
//! Installing a manifest makes the plugin known; its hooks are only
//! registered when the plugin is enabled.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use steward_core::{Error, Result};
use steward_hooks::Engine;

use crate::catalog::{actions, contexts, filters};

/// Configuration tables of a manifest
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestConfig {
    /// Entries for [`filters::CONFIG_BASE`]
    #[serde(default)]
    pub base: IndexMap<String, toml::Value>,
    /// Entries for [`filters::CONFIG_DEFAULTS`]
    #[serde(default)]
    pub defaults: IndexMap<String, toml::Value>,
    /// Entries for [`filters::CONFIG_OVERRIDES`]
    #[serde(default)]
    pub overrides: IndexMap<String, toml::Value>,
}

/// A plugin manifest
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Plugin name
    #[serde(default)]
    pub name: String,
    /// Plugin version, shown by `plugins list`
    #[serde(default)]
    pub version: Option<String>,
    /// Configuration contributed when enabled
    #[serde(default)]
    pub config: ManifestConfig,
    /// Patch name to patch content
    #[serde(default)]
    pub patches: IndexMap<String, String>,
    /// Template variables
    #[serde(default)]
    pub variables: IndexMap<String, toml::Value>,
    /// Template folder, relative to the manifest
    #[serde(default)]
    pub templates: Option<PathBuf>,
    /// Template source to destination
    #[serde(default)]
    pub targets: IndexMap<String, String>,
    /// File this manifest was read from
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl Manifest {
    /// Parse a manifest from TOML text
    ///
    /// `path` is used for error messages, the default name and relative paths.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut manifest: Manifest = toml::from_str(content).map_err(|e| Error::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if manifest.name.is_empty() {
            manifest.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        validate_name(&manifest.name).map_err(|message| Error::Manifest {
            path: path.to_path_buf(),
            message,
        })?;

        manifest.path = Some(path.to_path_buf());
        Ok(manifest)
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Version if declared, otherwise the manifest path
    pub fn info(&self) -> String {
        match (&self.version, &self.path) {
            (Some(version), _) => version.clone(),
            (None, Some(path)) => path.display().to_string(),
            (None, None) => String::new(),
        }
    }

    /// Absolute template folder, if any
    pub fn templates_root(&self) -> Option<PathBuf> {
        let templates = self.templates.as_ref()?;
        let base = self.path.as_deref().and_then(Path::parent);
        Some(match base {
            Some(base) if templates.is_relative() => base.join(templates),
            _ => templates.clone(),
        })
    }

    /// Register the manifest's contributions on the engine
    ///
    /// Called from the plugin's enable action, i.e. inside its `app:<name>`
    /// context. Empty tables register nothing.
    fn contribute(&self, engine: &Engine) {
        let config = &self.config;
        add_pairs(engine, &filters::CONFIG_BASE, &config.base);
        add_pairs(engine, &filters::CONFIG_DEFAULTS, &config.defaults);
        add_pairs(engine, &filters::CONFIG_OVERRIDES, &config.overrides);
        add_pairs(engine, &filters::ENV_PATCHES, &self.patches);
        add_pairs(engine, &filters::ENV_TEMPLATE_VARIABLES, &self.variables);
        add_pairs(engine, &filters::ENV_TEMPLATE_TARGETS, &self.targets);

        if let Some(root) = self.templates_root() {
            filters::ENV_TEMPLATE_ROOTS.add_item(engine, root);
        }
    }
}

fn add_pairs<V>(
    engine: &Engine,
    filter: &steward_hooks::Filter<Vec<(String, V)>>,
    pairs: &IndexMap<String, V>,
) where
    V: Clone + Send + Sync + 'static,
{
    if pairs.is_empty() {
        return;
    }
    let items = pairs
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    filter.add_items(engine, items);
}

/// Plugin names end up in hook and context names
fn validate_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("plugin name is empty".to_string());
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(format!("invalid character {c:?} in plugin name '{name}'"));
    }
    Ok(())
}

/// Make a plugin known to the engine
///
/// Adds the plugin to [`filters::PLUGINS_INSTALLED`] and [`filters::PLUGINS_INFO`],
/// and registers its [`actions::ENABLE_PLUGIN`] callback.
pub fn install_manifest(engine: &Engine, manifest: Manifest) -> Result<()> {
    let name = manifest.name.clone();
    tracing::debug!(plugin = %name, path = ?manifest.path, "Installing plugin manifest");

    filters::PLUGINS_INSTALLED.add_item(engine, name.clone());
    filters::PLUGINS_INFO.add_item(engine, (name.clone(), manifest.info()));

    let manifest = Arc::new(manifest);
    actions::ENABLE_PLUGIN.get(engine, &name)?.add(engine, move |engine, ()| {
        manifest.contribute(engine);
        filters::PLUGINS_ENABLED.add_item(engine, manifest.name.clone());
        Ok(())
    });
    Ok(())
}

/// Manifest files directly inside `root`, sorted by path
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "Plugins root does not exist");
        return Ok(Vec::new());
    }

    let escaped = glob::Pattern::escape(&root.to_string_lossy());
    let pattern = format!("{escaped}/*.toml");
    let paths = glob::glob(&pattern).map_err(|e| Error::Message(e.to_string()))?;

    let mut manifests = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| Error::Io(e.into_error()))?;
        if path.is_file() {
            manifests.push(path);
        }
    }
    manifests.sort();
    Ok(manifests)
}

/// Install every manifest found in `root`
///
/// Manifests that cannot be read or parsed are skipped with a warning, so one
/// broken file does not hide the other plugins.
pub fn install_from_root(engine: &Engine, root: &Path) -> Result<usize> {
    let _guard = engine.enter(contexts::PLUGINS_MANIFEST);

    let mut installed = 0;
    for path in discover(root)? {
        match Manifest::load(&path) {
            Ok(manifest) => {
                install_manifest(engine, manifest)?;
                installed += 1;
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping plugin manifest"),
        }
    }

    tracing::debug!(root = %root.display(), installed, "Discovered plugin manifests");
    Ok(installed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use tempfile::TempDir;

    const FULL: &str = r#"
name = "myplugin"
version = "1.2.0"
templates = "templates"

[config.base]
MYPLUGIN_SECRET = "changeme"

[config.defaults]
MYPLUGIN_PORT = 8080

[config.overrides]
LANGUAGE = "fr"

[patches]
nginx-extra = "location /myplugin { }"

[variables]
MYPLUGIN_BANNER = "hello"

[targets]
myplugin = "apps"
"#;

    #[test]
    fn test_parse_full_manifest() {
        let path = Path::new("/plugins/myplugin.toml");
        let manifest = Manifest::parse(FULL, path).unwrap();

        assert_eq!(manifest.name, "myplugin");
        assert_eq!(manifest.info(), "1.2.0");
        assert_eq!(
            manifest.config.defaults.get("MYPLUGIN_PORT"),
            Some(&toml::Value::Integer(8080))
        );
        assert_eq!(manifest.patches["nginx-extra"], "location /myplugin { }");
        assert_eq!(
            manifest.templates_root(),
            Some(PathBuf::from("/plugins/templates"))
        );
    }

    #[test]
    fn test_name_defaults_to_file_stem() {
        let manifest = Manifest::parse("", Path::new("/plugins/minimal.toml")).unwrap();
        assert_eq!(manifest.name, "minimal");
        assert_eq!(manifest.info(), "/plugins/minimal.toml");
        assert!(manifest.templates_root().is_none());
    }

    #[test]
    fn test_parse_errors_name_the_file() {
        let path = Path::new("/plugins/broken.toml");
        let err = Manifest::parse("name = [", path).unwrap_err();
        assert!(matches!(err, Error::Manifest { ref path, .. } if path.ends_with("broken.toml")));

        let err = Manifest::parse("unknown = 1", path).unwrap_err();
        assert!(matches!(err, Error::Manifest { .. }));

        let err = Manifest::parse(r#"name = "bad:name""#, path).unwrap_err();
        assert!(err.to_string().contains("invalid character"));
    }

    #[test]
    fn test_discover_only_toml_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("b.toml"), "").unwrap();
        std::fs::write(temp.path().join("a.toml"), "").unwrap();
        std::fs::write(temp.path().join("notes.md"), "").unwrap();
        std::fs::create_dir(temp.path().join("dir.toml")).unwrap();

        let found = discover(temp.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.toml", "b.toml"]);
    }

    #[test]
    fn test_discover_missing_root() {
        let temp = TempDir::new().unwrap();
        assert!(discover(&temp.path().join("missing")).unwrap().is_empty());
    }

    #[test]
    fn test_install_skips_broken_manifests() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("good.toml"), FULL).unwrap();
        std::fs::write(temp.path().join("broken.toml"), "name = [").unwrap();

        let engine = Engine::new();
        assert_eq!(install_from_root(&engine, temp.path()).unwrap(), 1);

        let installed: Vec<_> = filters::PLUGINS_INSTALLED
            .iterate(&engine, &())
            .map(Result::unwrap)
            .collect();
        assert_eq!(installed, ["myplugin"]);

        // Installation is owned by the manifest context
        let owners: Vec<_> = filters::PLUGINS_INSTALLED
            .entries(&engine)
            .into_iter()
            .filter_map(|e| e.context)
            .collect();
        assert_eq!(owners, ["plugins:manifest"]);
    }

    #[test]
    fn test_installed_plugin_contributes_nothing_until_enabled() {
        let engine = Engine::new();
        let manifest = Manifest::parse(FULL, Path::new("/plugins/myplugin.toml")).unwrap();
        install_manifest(&engine, manifest).unwrap();

        assert!(filters::CONFIG_BASE.entries(&engine).is_empty());
        assert!(filters::ENV_PATCHES.entries(&engine).is_empty());

        actions::ENABLE_PLUGIN
            .get(&engine, "myplugin")
            .unwrap()
            .run(&engine, &())
            .unwrap();

        let base = filters::CONFIG_BASE.apply(&engine, Vec::new(), &()).unwrap();
        assert_eq!(
            base,
            vec![(
                "MYPLUGIN_SECRET".to_string(),
                toml::Value::String("changeme".into())
            )]
        );
        let roots: Vec<_> = filters::ENV_TEMPLATE_ROOTS
            .iterate(&engine, &())
            .map(Result::unwrap)
            .collect();
        assert_eq!(roots, [PathBuf::from("/plugins/templates")]);
    }
}
