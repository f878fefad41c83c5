//! Context stack
//!
//! Tracks which context is active while hooks are registered. Each engine keeps
//! one stack per thread, so unrelated registration sequences running on
//! different threads never see each other's contexts.
//!
//! Entering a context returns a [`ContextGuard`]; dropping the guard pops the
//! most recent frame, including when the enclosed code returns early or panics.
//! The same name may be entered any number of times: a context is a label,
//! not a lock.

use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::name::ContextName;

static NEXT_STACK_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static STACKS: RefCell<HashMap<u64, Vec<ContextName>>> = RefCell::new(HashMap::new());
}

/// Per-thread stack of active contexts owned by one engine
#[derive(Debug)]
pub(crate) struct ContextStack {
    id: u64,
}

impl ContextStack {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_STACK_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub(crate) fn push(&self, name: ContextName) {
        STACKS.with(|stacks| {
            stacks.borrow_mut().entry(self.id).or_default().push(name);
        });
    }

    /// Pop the most recent frame; popping an empty stack is a no-op
    pub(crate) fn pop(&self) -> Option<ContextName> {
        STACKS.with(|stacks| {
            let mut stacks = stacks.borrow_mut();
            let stack = stacks.get_mut(&self.id)?;
            let popped = stack.pop();
            if stack.is_empty() {
                stacks.remove(&self.id);
            }
            popped
        })
    }

    pub(crate) fn current(&self) -> Option<ContextName> {
        STACKS.with(|stacks| {
            stacks
                .borrow()
                .get(&self.id)
                .and_then(|stack| stack.last().cloned())
        })
    }

    pub(crate) fn depth(&self) -> usize {
        STACKS.with(|stacks| stacks.borrow().get(&self.id).map_or(0, Vec::len))
    }

    /// Active contexts on this thread, outermost first
    pub(crate) fn frames(&self) -> Vec<ContextName> {
        STACKS.with(|stacks| stacks.borrow().get(&self.id).cloned().unwrap_or_default())
    }

    /// Drop every frame on the calling thread
    pub(crate) fn clear(&self) {
        STACKS.with(|stacks| {
            stacks.borrow_mut().remove(&self.id);
        });
    }
}

impl Drop for ContextStack {
    fn drop(&mut self) {
        // Frames left on other threads are unreachable once the engine is gone;
        // only the current thread's can be reclaimed here.
        let _ = STACKS.try_with(|stacks| {
            if let Ok(mut stacks) = stacks.try_borrow_mut() {
                stacks.remove(&self.id);
            }
        });
    }
}

/// Scoped handle for an entered context
///
/// Created by [`Engine::enter`](crate::Engine::enter). The frame is popped when
/// the guard is dropped. Guards are tied to the thread that created them.
#[must_use = "the context is exited as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard<'a> {
    stack: &'a ContextStack,
    name: ContextName,
    _not_send: PhantomData<*const ()>,
}

impl<'a> ContextGuard<'a> {
    pub(crate) fn new(stack: &'a ContextStack, name: ContextName) -> Self {
        stack.push(name.clone());
        Self {
            stack,
            name,
            _not_send: PhantomData,
        }
    }

    /// Name of the context this guard entered
    pub fn name(&self) -> &ContextName {
        &self.name
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.stack.pop();
    }
}
