//! Hooks command implementation
//!
//! Lists the hooks registered after startup, with the priority and owning
//! context of each callback in dispatch order.

use clap::{Args, ValueEnum};
use owo_colors::OwoColorize;
use steward_hooks::{Engine, EntryInfo, HookKind};

use crate::OutputFormat;
use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

/// Hook kind selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Actions only
    Action,
    /// Filters only
    Filter,
}

impl From<KindArg> for HookKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Action => HookKind::Action,
            KindArg::Filter => HookKind::Filter,
        }
    }
}

/// One hook with its callbacks
#[derive(Debug, Clone)]
pub struct HookListing {
    /// Actions or filters
    pub kind: HookKind,
    /// Hook name
    pub name: String,
    /// Callbacks in dispatch order
    pub callbacks: Vec<EntryInfo>,
}

/// Registered hooks, actions first, each kind sorted by name
#[must_use]
pub fn collect_hooks(engine: &Engine, kind: Option<HookKind>) -> Vec<HookListing> {
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => vec![HookKind::Action, HookKind::Filter],
    };

    kinds
        .into_iter()
        .flat_map(|kind| {
            engine.hook_names(kind).into_iter().map(move |name| HookListing {
                kind,
                callbacks: engine.entries(kind, name.as_str()),
                name: name.to_string(),
            })
        })
        .collect()
}

/// List registered hooks
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only list one kind of hook
    #[arg(short, long, value_enum)]
    pub kind: Option<KindArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl Command for ListCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let hooks = collect_hooks(context.engine(), self.kind.map(HookKind::from));

        if self.format == OutputFormat::Json {
            let json: Vec<_> = hooks
                .iter()
                .map(|hook| {
                    serde_json::json!({
                        "kind": hook.kind.name(),
                        "name": hook.name,
                        "callbacks": hook.callbacks.iter().map(|entry| {
                            serde_json::json!({
                                "priority": entry.priority,
                                "sequence": entry.sequence,
                                "context": entry.context.as_ref().map(ToString::to_string),
                            })
                        }).collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(());
        }

        if hooks.is_empty() {
            println!("{}", "No hooks registered".dimmed());
            return Ok(());
        }

        for hook in &hooks {
            println!(
                "  • {} {} ({} callbacks)",
                hook.kind.name().dimmed(),
                hook.name.green(),
                hook.callbacks.len()
            );
            for entry in &hook.callbacks {
                let context = entry
                    .context
                    .as_ref()
                    .map_or_else(|| "-".to_string(), ToString::to_string);
                println!(
                    "      priority {} context {}",
                    entry.priority.to_string().bold(),
                    context.cyan()
                );
            }
        }
        Ok(())
    }
}
