//! # Steward Hooks
//!
//! Extension-point engine for steward.
//!
//! Subsystems publish named hooks; extensions attach callbacks to them:
//!
//! - **Actions**: callbacks run in priority order for side effects
//! - **Filters**: callbacks fold a value, or contribute items to a list
//! - **Contexts**: every registration remembers the innermost active context,
//!   so everything an extension registered can be removed in one call
//! - **Templates**: families of hooks derived from one pattern (`app:{0}`)
//! - **Ordering helpers**: deterministic, deduplicated views of filter results
//!
//! Lower priority values run first; equal priorities run in registration order.

pub mod action;
pub mod context;
pub mod engine;
pub mod filter;
pub mod name;
pub mod ordering;
pub mod priority;
pub mod registry;

pub use action::{Action, ActionTemplate};
pub use context::ContextGuard;
pub use engine::{ActionFn, CallbackResult, Engine, FilterFn};
pub use filter::{Filter, FilterItems, FilterTemplate};
pub use name::{ContextName, ContextTemplate, HookName, HookTemplate};
pub use ordering::{sorted_by_first, sorted_unique, try_sorted_by_first, try_sorted_unique};
pub use registry::{EntryInfo, HookKind};

// Re-export error types from core
pub use steward_core::{BoxError, Error, Result};
