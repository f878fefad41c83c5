//! Hook registry
//!
//! Maps each hook name to its entries in dispatch order: ascending priority,
//! then ascending registration sequence. New entries are inserted at their
//! sorted position instead of re-sorting the whole list.
//!
//! A context index records, for every context, the hooks it registered
//! entries under, so removing a context only visits those hooks.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::name::{ContextName, HookName};

/// Type-erased callback; the typed handles know the concrete signature
pub(crate) type Callback = Arc<dyn Any + Send + Sync>;

/// The two families of hooks
///
/// Actions and filters live in separate tables: an action and a filter may
/// share a name without seeing each other's entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookKind {
    /// Callbacks run for side effects
    Action,
    /// Callbacks fold or contribute values
    Filter,
}

impl HookKind {
    /// Get the string name of this hook kind
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            HookKind::Action => "action",
            HookKind::Filter => "filter",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A registered callback
#[derive(Clone)]
pub(crate) struct Entry {
    pub(crate) priority: i32,
    pub(crate) sequence: u64,
    pub(crate) context: Option<ContextName>,
    pub(crate) callback: Callback,
}

impl Entry {
    fn info(&self) -> EntryInfo {
        EntryInfo {
            priority: self.priority,
            sequence: self.sequence,
            context: self.context.clone(),
        }
    }

    fn is_owned_by(&self, context: &str) -> bool {
        self.context.as_ref().is_some_and(|c| c.as_str() == context)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("priority", &self.priority)
            .field("sequence", &self.sequence)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Public view of an entry, in dispatch order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Dispatch priority (lower runs first)
    pub priority: i32,
    /// Registration sequence number (breaks priority ties)
    pub sequence: u64,
    /// Context that was active when the entry was registered
    pub context: Option<ContextName>,
}

type HookKey = (HookKind, HookName);

/// Hook tables plus the context index
#[derive(Debug, Default)]
pub(crate) struct Registry {
    actions: HashMap<HookName, Vec<Entry>>,
    filters: HashMap<HookName, Vec<Entry>>,
    owners: HashMap<ContextName, HashSet<HookKey>>,
    next_sequence: u64,
}

impl Registry {
    fn table(&self, kind: HookKind) -> &HashMap<HookName, Vec<Entry>> {
        match kind {
            HookKind::Action => &self.actions,
            HookKind::Filter => &self.filters,
        }
    }

    fn table_mut(&mut self, kind: HookKind) -> &mut HashMap<HookName, Vec<Entry>> {
        match kind {
            HookKind::Action => &mut self.actions,
            HookKind::Filter => &mut self.filters,
        }
    }

    /// Insert an entry at its sorted position and return its sequence number
    pub(crate) fn add(
        &mut self,
        kind: HookKind,
        name: HookName,
        priority: i32,
        context: Option<ContextName>,
        callback: Callback,
    ) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        if let Some(context) = &context {
            self.owners
                .entry(context.clone())
                .or_default()
                .insert((kind, name.clone()));
        }

        let entries = self.table_mut(kind).entry(name).or_default();
        // The new sequence is the largest so far: it goes after every entry
        // with the same or a lower priority.
        let position = entries.partition_point(|e| e.priority <= priority);
        entries.insert(
            position,
            Entry {
                priority,
                sequence,
                context,
                callback,
            },
        );

        sequence
    }

    /// Copy of the entries for `name`, in dispatch order
    pub(crate) fn snapshot(&self, kind: HookKind, name: &str) -> Arc<[Entry]> {
        self.table(kind)
            .get(name)
            .map_or_else(|| Arc::from(Vec::new()), |entries| Arc::from(entries.as_slice()))
    }

    /// Copy of the entries for `name` owned by `context`, in dispatch order
    pub(crate) fn snapshot_in_context(
        &self,
        kind: HookKind,
        name: &str,
        context: &str,
    ) -> Arc<[Entry]> {
        self.table(kind).get(name).map_or_else(
            || Arc::from(Vec::new()),
            |entries| {
                entries
                    .iter()
                    .filter(|e| e.is_owned_by(context))
                    .cloned()
                    .collect()
            },
        )
    }

    pub(crate) fn entries(&self, kind: HookKind, name: &str) -> Vec<EntryInfo> {
        self.table(kind)
            .get(name)
            .map(|entries| entries.iter().map(Entry::info).collect())
            .unwrap_or_default()
    }

    pub(crate) fn len(&self, kind: HookKind, name: &str) -> usize {
        self.table(kind).get(name).map_or(0, Vec::len)
    }

    /// Registered hook names of one kind, sorted
    pub(crate) fn hook_names(&self, kind: HookKind) -> Vec<HookName> {
        let mut names: Vec<HookName> = self.table(kind).keys().cloned().collect();
        names.sort();
        names
    }

    /// Contexts that currently own at least one entry, sorted
    pub(crate) fn contexts(&self) -> Vec<ContextName> {
        let mut contexts: Vec<ContextName> = self.owners.keys().cloned().collect();
        contexts.sort();
        contexts
    }

    /// Remove entries for `name`: only those owned by `context` if given, else all
    pub(crate) fn clear(&mut self, kind: HookKind, name: &str, context: Option<&str>) -> usize {
        let table = self.table_mut(kind);
        let Some(entries) = table.get_mut(name) else {
            return 0;
        };

        let removed: Vec<Entry> = match context {
            Some(context) => {
                let (removed, kept): (Vec<Entry>, Vec<Entry>) = std::mem::take(entries)
                    .into_iter()
                    .partition(|e| e.is_owned_by(context));
                *entries = kept;
                removed
            }
            None => std::mem::take(entries),
        };
        if entries.is_empty() {
            table.remove(name);
        }

        let key = (kind, HookName::from(name));
        for owner in removed.iter().filter_map(|e| e.context.as_ref()) {
            self.forget_owner(owner, &key);
        }

        removed.len()
    }

    /// Remove every entry owned by `context`, across all hooks of both kinds
    pub(crate) fn clear_all(&mut self, context: &str) -> usize {
        let Some(keys) = self.owners.remove(context) else {
            return 0;
        };

        let mut removed = 0;
        for (kind, name) in keys {
            let table = self.table_mut(kind);
            if let Some(entries) = table.get_mut(name.as_str()) {
                let before = entries.len();
                entries.retain(|e| !e.is_owned_by(context));
                removed += before - entries.len();
                if entries.is_empty() {
                    table.remove(name.as_str());
                }
            }
        }
        removed
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    fn forget_owner(&mut self, owner: &ContextName, key: &HookKey) {
        let (kind, name) = key;
        let still_owns = self
            .table(*kind)
            .get(name.as_str())
            .is_some_and(|entries| entries.iter().any(|e| e.context.as_ref() == Some(owner)));
        if still_owns {
            return;
        }

        if let Some(keys) = self.owners.get_mut(owner) {
            keys.remove(key);
            if keys.is_empty() {
                self.owners.remove(owner);
            }
        }
    }
}
