//! Steward CLI library
//!
//! Command-line interface over the steward hook engine: manage plugin
//! manifests, the project configuration and the patches plugins contribute.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod cmd;
pub mod command;
pub mod common;
pub mod error;

use command::Command;
use common::RuntimeContext;

/// Steward - a plugin host driven by hooks
#[derive(Parser)]
#[command(name = "steward")]
#[command(about = "Manage a project and the plugins that extend it")]
#[command(version)]
#[command(long_about = "Manage a project and the plugins that extend it

Plugins are TOML manifests found in the plugins root. Enabled plugins
contribute configuration defaults, overrides and named patches.

Examples:
  • steward plugins list
  • steward plugins enable mail
  • steward config printvalue LANGUAGE
  • steward patches show nginx")]
pub struct Cli {
    /// Path to the project root (holds config.toml)
    #[arg(long, env = "STEWARD_ROOT", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Folder scanned for plugin manifests
    #[arg(long, env = "STEWARD_PLUGINS_ROOT", value_name = "DIR")]
    pub plugins_root: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "STEWARD_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the steward CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Manage plugins (list, enable, disable)
    #[command(subcommand)]
    Plugins(PluginsCommands),

    /// Inspect and edit the project configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Show patches contributed by enabled plugins
    #[command(subcommand)]
    Patches(PatchesCommands),

    /// Inspect registered hooks
    #[command(subcommand)]
    Hooks(HooksCommands),
}

/// Plugin management commands
#[derive(Subcommand)]
pub enum PluginsCommands {
    /// List installed plugins and whether they are enabled
    List(cmd::plugins::ListCommand),

    /// Enable plugins and save them in the configuration
    Enable(cmd::plugins::EnableCommand),

    /// Disable plugins and remove the settings they overrode
    Disable(cmd::plugins::DisableCommand),
}

/// Configuration commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print a single configuration value
    Printvalue(cmd::config::PrintValueCommand),

    /// Show the full configuration, defaults included
    Show(cmd::config::ShowCommand),

    /// Save user settings to config.toml
    Save(cmd::config::SaveCommand),
}

/// Patch commands
#[derive(Subcommand)]
pub enum PatchesCommands {
    /// Print every contribution to a named patch
    Show(cmd::patches::ShowCommand),
}

/// Hook inspection commands
#[derive(Subcommand)]
pub enum HooksCommands {
    /// List registered hooks with their callbacks
    List(cmd::hooks::ListCommand),
}

/// Output format shared by listing commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable output
    #[default]
    Simple,
    /// JSON output
    Json,
}

fn execute_command(command: Commands, context: &RuntimeContext) -> Result<()> {
    match command {
        Commands::Plugins(plugins_cmd) => match plugins_cmd {
            PluginsCommands::List(list_cmd) => list_cmd.execute(context)?,
            PluginsCommands::Enable(enable_cmd) => enable_cmd.execute(context)?,
            PluginsCommands::Disable(disable_cmd) => disable_cmd.execute(context)?,
        },
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Printvalue(print_cmd) => print_cmd.execute(context)?,
            ConfigCommands::Show(show_cmd) => show_cmd.execute(context)?,
            ConfigCommands::Save(save_cmd) => save_cmd.execute(context)?,
        },
        Commands::Patches(PatchesCommands::Show(show_cmd)) => show_cmd.execute(context)?,
        Commands::Hooks(HooksCommands::List(list_cmd)) => list_cmd.execute(context)?,
    }
    Ok(())
}

/// Run the CLI application
///
/// Initializes logging, resolves the project and plugin roots, starts the
/// engine and dispatches the selected command.
///
/// # Errors
///
/// Returns an error if logging cannot be initialized, no default directory
/// can be determined, startup fails or the command fails.
pub fn run(cli: Cli) -> Result<()> {
    steward_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let root = match cli.root {
        Some(root) => root,
        None => steward_config::default_root().context("Failed to determine project root")?,
    };
    let plugins_root = match cli.plugins_root {
        Some(plugins_root) => plugins_root,
        None => steward_config::default_plugins_root()
            .context("Failed to determine plugins root")?,
    };

    let context = RuntimeContext::start(root, plugins_root)?;
    execute_command(cli.command, &context)
}
