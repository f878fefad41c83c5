//! Typed filter handles
//!
//! A filter is used in one of two ways:
//!
//! - as a **transformer**: [`Filter::apply`] folds an initial value through
//!   every callback, each one receiving the previous one's output;
//! - as a **list builder** (`Filter<Vec<I>, A>`): [`Filter::iterate`] yields
//!   the items each callback contributes, without folding. Callbacks added
//!   with [`Filter::add_item`] / [`Filter::add_items`] simply contribute
//!   fixed items.
//!
//! ```rust,ignore
//! const PLUGINS_INSTALLED: Filter<Vec<String>> = Filter::new("plugins:installed");
//!
//! PLUGINS_INSTALLED.add_item(&engine, "myplugin".to_string());
//! let installed = try_sorted_unique(PLUGINS_INSTALLED.iterate(&engine, &()))?;
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use steward_core::{Error, Result};

use crate::engine::{CallbackResult, Engine, FilterFn, downcast};
use crate::name::{ContextName, HookName, HookTemplate};
use crate::priority;
use crate::registry::{Entry, EntryInfo, HookKind};

/// Named chain of callbacks folding values `T` with extra arguments `A`
pub struct Filter<T, A = ()> {
    name: HookName,
    _signature: PhantomData<fn(T, &A) -> T>,
}

impl<T: 'static, A: 'static> Filter<T, A> {
    /// Declare a filter with a constant name
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: HookName::from_static(name),
            _signature: PhantomData,
        }
    }

    /// Bind a filter to a name built at runtime
    #[must_use]
    pub fn from_name(name: HookName) -> Self {
        Self {
            name,
            _signature: PhantomData,
        }
    }

    /// Name of this filter
    pub fn name(&self) -> &HookName {
        &self.name
    }

    /// Register a callback at the default priority
    pub fn add<F>(&self, engine: &Engine, callback: F) -> u64
    where
        F: Fn(&Engine, T, &A) -> CallbackResult<T> + Send + Sync + 'static,
    {
        self.add_with_priority(engine, priority::DEFAULT, callback)
    }

    /// Register a callback at an explicit priority
    pub fn add_with_priority<F>(&self, engine: &Engine, priority: i32, callback: F) -> u64
    where
        F: Fn(&Engine, T, &A) -> CallbackResult<T> + Send + Sync + 'static,
    {
        engine.add_filter(&self.name, priority, callback)
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
        F: Fn(&Engine, T, &A) -> CallbackResult<T> + Send + Sync + 'static,
    {
        engine.add_filter_in(&self.name, priority, context, callback)
    }

    /// Fold `value` through every callback
    pub fn apply(&self, engine: &Engine, value: T, args: &A) -> Result<T> {
        engine.apply_filter(self.name.as_str(), value, args)
    }

    /// Remove every callback of this filter
    pub fn clear(&self, engine: &Engine) -> usize {
        engine.clear(HookKind::Filter, self.name.as_str(), None)
    }

    /// Remove the callbacks registered under `context`
    pub fn clear_in_context(&self, engine: &Engine, context: &str) -> usize {
        engine.clear(HookKind::Filter, self.name.as_str(), Some(context))
    }

    /// Callbacks in dispatch order
    pub fn entries(&self, engine: &Engine) -> Vec<EntryInfo> {
        engine.entries(HookKind::Filter, self.name.as_str())
    }
}

impl<I, A> Filter<Vec<I>, A>
where
    I: Clone + Send + Sync + 'static,
    A: 'static,
{
    /// Contribute one item at the default priority
    pub fn add_item(&self, engine: &Engine, item: I) -> u64 {
        self.add_items_with_priority(engine, priority::DEFAULT, vec![item])
    }

    /// Contribute one item at an explicit priority
    pub fn add_item_with_priority(&self, engine: &Engine, priority: i32, item: I) -> u64 {
        self.add_items_with_priority(engine, priority, vec![item])
    }

    /// Contribute several items, in order, at the default priority
    pub fn add_items(&self, engine: &Engine, items: Vec<I>) -> u64 {
        self.add_items_with_priority(engine, priority::DEFAULT, items)
    }

    /// Contribute several items, in order, at an explicit priority
    pub fn add_items_with_priority(&self, engine: &Engine, priority: i32, items: Vec<I>) -> u64 {
        self.add_with_priority(engine, priority, move |_, mut values: Vec<I>, _| {
            values.extend(items.iter().cloned());
            Ok(values)
        })
    }

    /// Contribute one item owned by an explicit context instead of the current one
    pub fn add_item_in_context(
        &self,
        engine: &Engine,
        priority: i32,
        context: Option<ContextName>,
        item: I,
    ) -> u64 {
        self.add_in_context(engine, priority, context, move |_, mut values: Vec<I>, _| {
            values.push(item.clone());
            Ok(values)
        })
    }

    /// Lazily yield the items contributed by every callback
    pub fn iterate<'a>(&self, engine: &'a Engine, args: &'a A) -> FilterItems<'a, I, A> {
        engine.iterate_filter(self.name.as_str(), args)
    }

    /// Like [`Filter::iterate`], restricted to callbacks owned by `context`
    pub fn iterate_in_context<'a>(
        &self,
        engine: &'a Engine,
        context: &str,
        args: &'a A,
    ) -> FilterItems<'a, I, A> {
        engine.iterate_filter_in(self.name.as_str(), context, args)
    }
}

impl<T, A> Clone for Filter<T, A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _signature: PhantomData,
        }
    }
}

impl<T, A> fmt::Debug for Filter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Filter").field(&self.name).finish()
    }
}

/// Family of filters, one per argument of the pattern (`env:patches:{0}`)
pub struct FilterTemplate<T, A = ()> {
    template: HookTemplate,
    _signature: PhantomData<fn(T, &A) -> T>,
}

impl<T: 'static, A: 'static> FilterTemplate<T, A> {
    /// Declare a family of filters
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
    pub fn get(&self, engine: &Engine, arg: &str) -> Result<Filter<T, A>> {
        engine.hook_name(&self.template, arg).map(Filter::from_name)
    }
}

impl<T, A> fmt::Debug for FilterTemplate<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FilterTemplate")
            .field(&self.template.pattern())
            .finish()
    }
}

/// Items contributed by the callbacks of a list filter
///
/// The entry list is captured when the iterator is created: callbacks added
/// or removed while it is being consumed only affect the next `iterate()`
/// call. Each callback runs when the iterator reaches it, receives an empty
/// list, and the items it returns are yielded in order.
///
/// A callback failure is yielded once as `Err` and ends the iteration.
/// [`FilterItems::replay`] starts over on the same captured entries.
pub struct FilterItems<'a, I, A> {
    engine: &'a Engine,
    hook: HookName,
    entries: Arc<[Entry]>,
    args: &'a A,
    position: usize,
    pending: std::vec::IntoIter<I>,
}

impl<'a, I: 'static, A: 'static> FilterItems<'a, I, A> {
    pub(crate) fn new(
        engine: &'a Engine,
        hook: HookName,
        entries: Arc<[Entry]>,
        args: &'a A,
    ) -> Self {
        if !entries.is_empty() {
            tracing::debug!(hook = %hook, count = entries.len(), "Iterating filter");
        }
        Self {
            engine,
            hook,
            entries,
            args,
            position: 0,
            pending: Vec::new().into_iter(),
        }
    }

    /// A fresh iterator over the same captured entries
    #[must_use]
    pub fn replay(&self) -> Self {
        Self {
            engine: self.engine,
            hook: self.hook.clone(),
            entries: Arc::clone(&self.entries),
            args: self.args,
            position: 0,
            pending: Vec::new().into_iter(),
        }
    }

    /// Number of callbacks captured by this iterator
    pub fn callback_count(&self) -> usize {
        self.entries.len()
    }

    /// Context owning the callback that contributed the last yielded item
    pub fn owner(&self) -> Option<&ContextName> {
        self.position
            .checked_sub(1)
            .and_then(|index| self.entries.get(index))
            .and_then(|entry| entry.context.as_ref())
    }

    fn contribution(&self, entry: &Entry) -> Result<Vec<I>> {
        let callback = downcast::<FilterFn<Vec<I>, A>>(self.hook.as_str(), entry)?;
        tracing::trace!(hook = %self.hook, sequence = entry.sequence, "Calling filter callback");
        callback(self.engine, Vec::new(), self.args)
            .map_err(|e| Error::callback(self.hook.as_str(), e))
    }
}

impl<I: 'static, A: 'static> Iterator for FilterItems<'_, I, A> {
    type Item = Result<I>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.next() {
                return Some(Ok(item));
            }

            let entry = self.entries.get(self.position)?.clone();
            self.position += 1;

            match self.contribution(&entry) {
                Ok(items) => self.pending = items.into_iter(),
                Err(e) => {
                    self.position = self.entries.len();
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<I: Clone, A> Clone for FilterItems<'_, I, A> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine,
            hook: self.hook.clone(),
            entries: Arc::clone(&self.entries),
            args: self.args,
            position: self.position,
            pending: self.pending.clone(),
        }
    }
}

impl<I, A> fmt::Debug for FilterItems<'_, I, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterItems")
            .field("hook", &self.hook)
            .field("position", &self.position)
            .field("callbacks", &self.entries.len())
            .finish_non_exhaustive()
    }
}
