//! Config command implementation
//!
//! Print single values, show the merged configuration and save user settings.

use clap::Args;
use owo_colors::OwoColorize;
use steward_config::Config;

use crate::OutputFormat;
use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};

/// Render a setting the way it is printed to users
///
/// Strings are printed raw; other values use their TOML form.
#[must_use]
pub fn display_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Split a `KEY=VALUE` argument and parse its value
///
/// # Errors
///
/// Returns `InvalidSetting` when there is no `=` or the key is empty.
pub fn parse_assignment(raw: &str) -> Result<(String, toml::Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| CommandError::invalid_setting(raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CommandError::invalid_setting(raw));
    }
    Ok((key.to_string(), steward_config::config::parse_value(value)))
}

/// Print a single configuration value
#[derive(Debug, Args)]
pub struct PrintValueCommand {
    /// Setting to print
    pub key: String,
}

impl Command for PrintValueCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let config = steward_config::load(context.engine(), context.root())?;
        let value = config
            .get(&self.key)
            .ok_or_else(|| CommandError::key_not_found(&self.key))?;
        println!("{}", display_value(value));
        Ok(())
    }
}

/// Show the full configuration
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl Command for ShowCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let config = steward_config::load_full(context.engine(), context.root())?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
            OutputFormat::Simple => {
                for (key, value) in &config {
                    println!("{} = {}", key.cyan(), display_value(value));
                }
            }
        }
        Ok(())
    }
}

/// Save the user configuration
#[derive(Debug, Args)]
pub struct SaveCommand {
    /// Set a value before saving
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Remove a value before saving
    #[arg(long = "unset", value_name = "KEY")]
    pub unset: Vec<String>,
}

impl SaveCommand {
    /// Apply `--set` then `--unset` to a configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidSetting` for a malformed `--set` argument.
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        for raw in &self.set {
            let (key, value) = parse_assignment(raw)?;
            config.insert(key, value);
        }
        for key in &self.unset {
            config.shift_remove(key);
        }
        Ok(())
    }
}

impl Command for SaveCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let mut config = steward_config::load_minimal(context.engine(), context.root())?;
        self.apply(&mut config)?;
        steward_config::save(context.root(), &config)?;
        println!(
            "{} Configuration saved to {}",
            "✓".green(),
            steward_config::config::config_path(context.root()).display()
        );
        Ok(())
    }
}
