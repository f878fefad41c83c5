//! The hook engine
//!
//! One [`Engine`] owns every hook table of the process. It is built once at
//! startup and shared by reference with every collaborator; [`Engine::reset`]
//! empties it between tests.
//!
//! ## Dispatch policy
//!
//! Every dispatch (`do_action`, `apply_filter`, `iterate_filter`) copies the
//! entry list when it starts and never holds the registry lock while a
//! callback runs. Callbacks can therefore register or clear hooks, including
//! the one being dispatched; those changes apply to the next dispatch only.
//! A callback that clears a later callback of the same pass does not stop
//! that later callback from running.

use std::any::type_name;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use steward_core::{BoxError, Error, Result};

use crate::context::{ContextGuard, ContextStack};
use crate::filter::FilterItems;
use crate::name::{self, ContextName, ContextTemplate, HookName, HookTemplate};
use crate::registry::{Callback, Entry, EntryInfo, HookKind, Registry};

/// Result returned by hook callbacks
pub type CallbackResult<T> = std::result::Result<T, BoxError>;

/// Signature of an action callback taking arguments `A`
pub type ActionFn<A> = dyn Fn(&Engine, &A) -> CallbackResult<()> + Send + Sync;

/// Signature of a filter callback folding values `T` with arguments `A`
pub type FilterFn<T, A> = dyn Fn(&Engine, T, &A) -> CallbackResult<T> + Send + Sync;

/// Registry of actions and filters, plus the context stack
///
/// Names built from templates are cached per `(pattern, argument)` pair. The
/// cache is unbounded: long-running embedders that instantiate templates with
/// many distinct arguments should call [`Engine::reset`] to release it.
pub struct Engine {
    registry: Mutex<Registry>,
    contexts: ContextStack,
    names: Mutex<HashMap<(&'static str, String), Arc<str>>>,
}

impl Engine {
    /// Create an empty engine
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            contexts: ContextStack::new(),
            names: Mutex::new(HashMap::new()),
        }
    }

    // ------------------------------------------------------------------
    // Contexts
    // ------------------------------------------------------------------

    /// Enter a context until the returned guard is dropped
    ///
    /// Entries registered while the guard is alive are owned by `name` and can
    /// be removed together with [`Engine::clear_all`].
    pub fn enter(&self, name: impl Into<ContextName>) -> ContextGuard<'_> {
        let name = name.into();
        tracing::trace!(context = %name, "Entering hook context");
        ContextGuard::new(&self.contexts, name)
    }

    /// Run `f` inside a context
    pub fn with_context<R>(&self, name: impl Into<ContextName>, f: impl FnOnce() -> R) -> R {
        let _guard = self.enter(name);
        f()
    }

    /// Innermost active context on the calling thread
    pub fn current_context(&self) -> Option<ContextName> {
        self.contexts.current()
    }

    /// Number of active context frames on the calling thread
    pub fn context_depth(&self) -> usize {
        self.contexts.depth()
    }

    /// Active contexts on the calling thread, outermost first
    pub fn active_contexts(&self) -> Vec<ContextName> {
        self.contexts.frames()
    }

    // ------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------

    /// Instantiate a hook template, reusing previously built names
    pub fn hook_name(&self, template: &HookTemplate, arg: &str) -> Result<HookName> {
        self.instantiate(template.pattern(), arg).map(HookName::from)
    }

    /// Instantiate a context template, reusing previously built names
    pub fn context_name(&self, template: &ContextTemplate, arg: &str) -> Result<ContextName> {
        self.instantiate(template.pattern(), arg).map(ContextName::from)
    }

    fn instantiate(&self, pattern: &'static str, arg: &str) -> Result<Arc<str>> {
        let mut names = self.names.lock();
        if let Some(name) = names.get(&(pattern, arg.to_string())) {
            return Ok(Arc::clone(name));
        }

        let name: Arc<str> = Arc::from(name::render(pattern, arg)?);
        names.insert((pattern, arg.to_string()), Arc::clone(&name));
        Ok(name)
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register an action callback owned by the current context
    pub fn add_action<A, F>(&self, name: impl Into<HookName>, priority: i32, callback: F) -> u64
    where
        A: 'static,
        F: Fn(&Engine, &A) -> CallbackResult<()> + Send + Sync + 'static,
    {
        self.add_action_in(name, priority, self.current_context(), callback)
    }

    /// Register an action callback owned by an explicit context
    pub fn add_action_in<A, F>(
        &self,
        name: impl Into<HookName>,
        priority: i32,
        context: Option<ContextName>,
        callback: F,
    ) -> u64
    where
        A: 'static,
        F: Fn(&Engine, &A) -> CallbackResult<()> + Send + Sync + 'static,
    {
        let callback: Box<ActionFn<A>> = Box::new(callback);
        self.register(HookKind::Action, name.into(), priority, context, Arc::new(callback))
    }

    /// Register a filter callback owned by the current context
    pub fn add_filter<T, A, F>(&self, name: impl Into<HookName>, priority: i32, callback: F) -> u64
    where
        T: 'static,
        A: 'static,
        F: Fn(&Engine, T, &A) -> CallbackResult<T> + Send + Sync + 'static,
    {
        self.add_filter_in(name, priority, self.current_context(), callback)
    }

    /// Register a filter callback owned by an explicit context
    pub fn add_filter_in<T, A, F>(
        &self,
        name: impl Into<HookName>,
        priority: i32,
        context: Option<ContextName>,
        callback: F,
    ) -> u64
    where
        T: 'static,
        A: 'static,
        F: Fn(&Engine, T, &A) -> CallbackResult<T> + Send + Sync + 'static,
    {
        let callback: Box<FilterFn<T, A>> = Box::new(callback);
        self.register(HookKind::Filter, name.into(), priority, context, Arc::new(callback))
    }

    fn register(
        &self,
        kind: HookKind,
        name: HookName,
        priority: i32,
        context: Option<ContextName>,
        callback: Callback,
    ) -> u64 {
        tracing::debug!(
            %kind,
            hook = %name,
            priority,
            context = context.as_ref().map_or("-", ContextName::as_str),
            "Hook callback registered"
        );
        self.registry
            .lock()
            .add(kind, name, priority, context, callback)
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Run every callback of an action, in order, stopping at the first error
    ///
    /// Invoking an action nobody registered against does nothing.
    pub fn do_action<A: 'static>(&self, name: &str, args: &A) -> Result<()> {
        let entries = self.snapshot(HookKind::Action, name);
        if entries.is_empty() {
            tracing::trace!(hook = name, "No callbacks for action");
            return Ok(());
        }

        let callbacks = resolve::<ActionFn<A>>(name, &entries)?;
        tracing::debug!(hook = name, count = callbacks.len(), "Running action");

        for callback in callbacks {
            callback(self, args).map_err(|e| Error::callback(name, e))?;
        }
        Ok(())
    }

    /// Fold `value` through every callback of a filter, in order
    ///
    /// With no callbacks the initial value is returned unchanged.
    pub fn apply_filter<T: 'static, A: 'static>(&self, name: &str, value: T, args: &A) -> Result<T> {
        let entries = self.snapshot(HookKind::Filter, name);
        if entries.is_empty() {
            return Ok(value);
        }

        let callbacks = resolve::<FilterFn<T, A>>(name, &entries)?;
        tracing::debug!(hook = name, count = callbacks.len(), "Applying filter");

        let mut value = value;
        for callback in callbacks {
            value = callback(self, value, args).map_err(|e| Error::callback(name, e))?;
        }
        Ok(value)
    }

    /// Lazily collect the items contributed by every callback of a list filter
    ///
    /// Entries are captured when this is called; see [`FilterItems`].
    pub fn iterate_filter<'a, I: 'static, A: 'static>(
        &'a self,
        name: &str,
        args: &'a A,
    ) -> FilterItems<'a, I, A> {
        let entries = self.snapshot(HookKind::Filter, name);
        FilterItems::new(self, HookName::from(name), entries, args)
    }

    /// Like [`Engine::iterate_filter`], restricted to entries owned by `context`
    pub fn iterate_filter_in<'a, I: 'static, A: 'static>(
        &'a self,
        name: &str,
        context: &str,
        args: &'a A,
    ) -> FilterItems<'a, I, A> {
        let entries = self
            .registry
            .lock()
            .snapshot_in_context(HookKind::Filter, name, context);
        FilterItems::new(self, HookName::from(name), entries, args)
    }

    fn snapshot(&self, kind: HookKind, name: &str) -> Arc<[Entry]> {
        self.registry.lock().snapshot(kind, name)
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Remove the entries of one hook: those owned by `context`, or all of them
    pub fn clear(&self, kind: HookKind, name: &str, context: Option<&str>) -> usize {
        let removed = self.registry.lock().clear(kind, name, context);
        tracing::debug!(
            %kind,
            hook = name,
            context = context.unwrap_or("-"),
            removed,
            "Hook callbacks cleared"
        );
        removed
    }

    /// Remove every action and filter entry owned by `context`
    pub fn clear_all(&self, context: &str) -> usize {
        let removed = self.registry.lock().clear_all(context);
        tracing::debug!(context, removed, "Hook context cleared");
        removed
    }

    /// Remove all hooks, cached names and this thread's context frames
    pub fn reset(&self) {
        self.registry.lock().reset();
        self.names.lock().clear();
        self.contexts.clear();
        tracing::debug!("Hook engine reset");
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Entries of one hook in dispatch order
    pub fn entries(&self, kind: HookKind, name: &str) -> Vec<EntryInfo> {
        self.registry.lock().entries(kind, name)
    }

    /// Number of entries registered for one hook
    pub fn len(&self, kind: HookKind, name: &str) -> usize {
        self.registry.lock().len(kind, name)
    }

    /// Whether any entry is registered for one hook
    pub fn has_callbacks(&self, kind: HookKind, name: &str) -> bool {
        self.len(kind, name) > 0
    }

    /// Names that currently have entries, sorted
    pub fn hook_names(&self, kind: HookKind) -> Vec<HookName> {
        self.registry.lock().hook_names(kind)
    }

    /// Contexts that currently own entries, sorted
    pub fn contexts(&self) -> Vec<ContextName> {
        self.registry.lock().contexts()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &*self.registry.lock())
            .finish_non_exhaustive()
    }
}

/// Recover the typed callbacks of a snapshot
///
/// Fails before any callback runs if one was registered with another signature.
pub(crate) fn resolve<'e, F: ?Sized + 'static>(
    name: &str,
    entries: &'e [Entry],
) -> Result<Vec<&'e F>> {
    entries.iter().map(|entry| downcast::<F>(name, entry)).collect()
}

pub(crate) fn downcast<'e, F: ?Sized + 'static>(name: &str, entry: &'e Entry) -> Result<&'e F> {
    entry
        .callback
        .downcast_ref::<Box<F>>()
        .map(|callback| &**callback)
        .ok_or_else(|| Error::SignatureMismatch {
            hook: name.to_string(),
            expected: type_name::<F>(),
        })
}
