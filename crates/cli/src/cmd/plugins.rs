//! Plugins command implementation
//!
//! List, enable and disable plugins. Enabled plugins are saved under the
//! `PLUGINS` setting so they are enabled again on the next run.

use clap::Args;
use comfy_table::{Cell, Color, Table, presets};
use owo_colors::OwoColorize;
use serde::Serialize;
use steward_hooks::Engine;

use crate::OutputFormat;
use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

/// An installed plugin as shown by `plugins list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginRow {
    /// Plugin name
    pub name: String,
    /// Version, or manifest path when no version is declared
    pub info: String,
    /// Whether the plugin is enabled
    pub enabled: bool,
}

/// Installed plugins sorted by name
///
/// # Errors
///
/// Returns an error if a plugin callback fails.
pub fn plugin_rows(engine: &Engine) -> steward_core::Result<Vec<PluginRow>> {
    let enabled = steward_plugins::iter_enabled(engine)?;
    Ok(steward_plugins::iter_info(engine)?
        .into_iter()
        .map(|(name, info)| PluginRow {
            enabled: enabled.contains(&name),
            name,
            info,
        })
        .collect())
}

/// List installed plugins
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl Command for ListCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let rows = plugin_rows(context.engine())?;

        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        if rows.is_empty() {
            println!(
                "{}",
                format!(
                    "No plugins installed in {}",
                    context.plugins_root().display()
                )
                .dimmed()
            );
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_header(vec!["NAME", "STATUS", "VERSION"]);
        for row in rows {
            let status = if row.enabled {
                Cell::new("enabled").fg(Color::Green)
            } else {
                Cell::new("installed")
            };
            table.add_row(vec![Cell::new(row.name), status, Cell::new(row.info)]);
        }
        println!("{table}");
        Ok(())
    }
}

/// Enable plugins
#[derive(Debug, Args)]
pub struct EnableCommand {
    /// Plugins to enable
    #[arg(required = true, value_name = "PLUGIN")]
    pub names: Vec<String>,
}

impl Command for EnableCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let engine = context.engine();
        let mut config = steward_config::load_minimal(engine, context.root())?;

        for name in &self.names {
            if steward_plugins::is_enabled(engine, name)? {
                println!("{} Plugin {} is already enabled", "•".dimmed(), name.bold());
                continue;
            }
            steward_plugins::enable(engine, name)?;
            println!("{} Plugin {} enabled", "✓".green(), name.bold());
        }

        steward_config::save_enabled_plugins(engine, &mut config)?;
        steward_config::save(context.root(), &config)?;
        Ok(())
    }
}

/// Disable plugins
#[derive(Debug, Args)]
pub struct DisableCommand {
    /// Plugins to disable
    #[arg(required = true, value_name = "PLUGIN")]
    pub names: Vec<String>,
}

impl Command for DisableCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let engine = context.engine();
        let mut config = steward_config::load_minimal(engine, context.root())?;

        for name in &self.names {
            let removed = steward_config::disable_plugin(engine, &mut config, name)?;
            for (key, value) in removed {
                println!("  {} {key} = {value}", "removed".yellow());
            }
            println!("{} Plugin {} disabled", "✓".green(), name.bold());
        }

        steward_config::save(context.root(), &config)?;
        Ok(())
    }
}
