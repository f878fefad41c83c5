//! Command trait for the steward CLI
//!
//! Every subcommand implements `Command`, so commands share one way of
//! receiving the started engine and resolved paths.

use crate::common::RuntimeContext;
use crate::error::Result;

/// Trait for all steward commands
///
/// The `execute` method receives a `RuntimeContext` holding the engine after
/// startup, with installed plugins discovered and configured plugins enabled.
///
/// # Example
///
/// ```rust,ignore
/// use crate::command::Command;
/// use crate::common::RuntimeContext;
/// use crate::error::Result;
/// use clap::Args;
///
/// #[derive(Debug, Args)]
/// pub struct MyCommand {
///     #[arg(short, long)]
///     pub some_flag: bool,
/// }
///
/// impl Command for MyCommand {
///     type Output = ();
///
///     fn execute(&self, context: &RuntimeContext) -> Result<()> {
///         let enabled = steward_plugins::iter_enabled(context.engine())?;
///         Ok(())
///     }
/// }
/// ```
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command with the given runtime context
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` when a hook callback, the configuration file
    /// or the arguments fail.
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
