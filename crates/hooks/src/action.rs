//! Typed action handles
//!
//! An [`Action`] binds a hook name to the argument type its callbacks accept,
//! so registrations and dispatches cannot disagree on the signature.
//!
//! ```rust,ignore
//! const CORE_READY: Action = Action::new("core:ready");
//!
//! CORE_READY.add(&engine, |_engine, ()| {
//!     tracing::info!("core ready");
//!     Ok(())
//! });
//! CORE_READY.run(&engine, &())?;
//! ```

use std::fmt;
use std::marker::PhantomData;

use steward_core::Result;

use crate::engine::{CallbackResult, Engine};
use crate::name::{ContextName, HookName, HookTemplate};
use crate::priority;
use crate::registry::{EntryInfo, HookKind};

/// Named chain of callbacks invoked for side effects with arguments `A`
pub struct Action<A = ()> {
    name: HookName,
    _signature: PhantomData<fn(&A)>,
}

impl<A: 'static> Action<A> {
    /// Declare an action with a constant name
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: HookName::from_static(name),
            _signature: PhantomData,
        }
    }

    /// Bind an action to a name built at runtime
    #[must_use]
    pub fn from_name(name: HookName) -> Self {
        Self {
            name,
            _signature: PhantomData,
        }
    }

    /// Name of this action
    pub fn name(&self) -> &HookName {
        &self.name
    }

    /// Register a callback at the default priority
    pub fn add<F>(&self, engine: &Engine, callback: F) -> u64
    where
        F: Fn(&Engine, &A) -> CallbackResult<()> + Send + Sync + 'static,
    {
        self.add_with_priority(engine, priority::DEFAULT, callback)
    }

    /// Register a callback at an explicit priority
    pub fn add_with_priority<F>(&self, engine: &Engine, priority: i32, callback: F) -> u64
    where
        F: Fn(&Engine, &A) -> CallbackResult<()> + Send + Sync + 'static,
    {
        engine.add_action(&self.name, priority, callback)
    }

    /// Register a callback owned by an explicit context instead of the current one
    pub fn add_in_context<F>(
        &self,
        engine: &Engine,
        priority: i32,
        context: Option<ContextName>,
        callback: F,
    ) -> u64
    where
        F: Fn(&Engine, &A) -> CallbackResult<()> + Send + Sync + 'static,
    {
        engine.add_action_in(&self.name, priority, context, callback)
    }

    /// Run every callback in order; the first failure aborts the dispatch
    pub fn run(&self, engine: &Engine, args: &A) -> Result<()> {
        engine.do_action(self.name.as_str(), args)
    }

    /// Remove every callback of this action
    pub fn clear(&self, engine: &Engine) -> usize {
        engine.clear(HookKind::Action, self.name.as_str(), None)
    }

    /// Remove the callbacks registered under `context`
    pub fn clear_in_context(&self, engine: &Engine, context: &str) -> usize {
        engine.clear(HookKind::Action, self.name.as_str(), Some(context))
    }

    /// Callbacks in dispatch order
    pub fn entries(&self, engine: &Engine) -> Vec<EntryInfo> {
        engine.entries(HookKind::Action, self.name.as_str())
    }
}

impl<A> Clone for Action<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _signature: PhantomData,
        }
    }
}

impl<A> fmt::Debug for Action<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Action").field(&self.name).finish()
    }
}

/// Family of actions, one per argument of the pattern (`plugins:enable:{0}`)
pub struct ActionTemplate<A = ()> {
    template: HookTemplate,
    _signature: PhantomData<fn(&A)>,
}

impl<A: 'static> ActionTemplate<A> {
    /// Declare a family of actions
    #[must_use]
    pub const fn new(pattern: &'static str) -> Self {
        Self {
            template: HookTemplate::new(pattern),
            _signature: PhantomData,
        }
    }

    /// The raw pattern
    pub fn pattern(&self) -> &'static str {
        self.template.pattern()
    }

    /// The member of the family for `arg`
    pub fn get(&self, engine: &Engine, arg: &str) -> Result<Action<A>> {
        engine.hook_name(&self.template, arg).map(Action::from_name)
    }
}

impl<A> fmt::Debug for ActionTemplate<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActionTemplate")
            .field(&self.template.pattern())
            .finish()
    }
}
