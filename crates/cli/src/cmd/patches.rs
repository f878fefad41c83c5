//! Patches command implementation

use clap::Args;
use steward_hooks::Engine;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

/// Every contribution to a named patch, one per line, in enable order
///
/// # Errors
///
/// Returns an error if a plugin callback fails.
pub fn render_patch(engine: &Engine, name: &str) -> steward_core::Result<String> {
    Ok(steward_plugins::iter_patches(engine, name)?.join("\n"))
}

/// Print a named patch
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Patch name
    pub name: String,
}

impl Command for ShowCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        println!("{}", render_patch(context.engine(), &self.name)?);
        Ok(())
    }
}
