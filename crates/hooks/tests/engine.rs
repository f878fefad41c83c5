//! Integration tests for hook ordering, context removal and dispatch policy

use std::sync::Arc;

use parking_lot::Mutex;
use steward_hooks::{
    Action, CallbackResult, Engine, Filter, FilterTemplate, HookKind, Result, priority,
    try_sorted_unique,
};

const STEP: Action = Action::new("test:step");
const VALUE: Filter<i64> = Filter::new("x");
const ITEMS: Filter<Vec<String>> = Filter::new("test:items");
const FAMILY: FilterTemplate<i64> = FilterTemplate::new("p:{0}");

type Log = Arc<Mutex<Vec<String>>>;

fn record(engine: &Engine, log: &Log, label: &str, priority: i32) {
    let log = Arc::clone(log);
    let label = label.to_string();
    STEP.add_with_priority(engine, priority, move |_, ()| {
        log.lock().push(label.clone());
        Ok(())
    });
}

fn collect_items(engine: &Engine) -> Vec<String> {
    ITEMS
        .iterate(engine, &())
        .collect::<Result<Vec<_>>>()
        .unwrap()
}

#[test]
fn test_dispatch_order_is_priority_then_registration() {
    let engine = Engine::new();
    let log: Log = Arc::default();

    let registrations = [
        ("a", 30),
        ("b", 10),
        ("c", 30),
        ("d", -5),
        ("e", 10),
        ("f", priority::DEFAULT),
    ];
    for (label, priority) in registrations {
        record(&engine, &log, label, priority);
        ITEMS.add_item_with_priority(&engine, priority, label.to_string());
        VALUE.add_with_priority(&engine, priority, move |_, v, ()| {
            Ok(v * 10 + i64::from(label.as_bytes()[0] - b'a'))
        });
    }

    let expected = ["d", "b", "e", "f", "a", "c"];

    STEP.run(&engine, &()).unwrap();
    assert_eq!(*log.lock(), expected);
    assert_eq!(collect_items(&engine), expected);
    // Digits spell the visiting order: d=3 b=1 e=4 f=5 a=0 c=2
    assert_eq!(VALUE.apply(&engine, 0, &()).unwrap(), 314_502);

    // Repeated dispatches are deterministic
    log.lock().clear();
    STEP.run(&engine, &()).unwrap();
    assert_eq!(*log.lock(), expected);
}

#[test]
fn test_clear_all_removes_exactly_the_context_entries() {
    let engine = Engine::new();
    let log: Log = Arc::default();

    record(&engine, &log, "root", priority::DEFAULT);
    {
        let _plugins = engine.enter("plugins");
        record(&engine, &log, "plugins", priority::DEFAULT);
        {
            let _x = engine.enter("app:x");
            record(&engine, &log, "x-1", priority::DEFAULT);
            ITEMS.add_item(&engine, "from-x".to_string());
            {
                // Nested context owns its own entries
                let _y = engine.enter("app:y");
                record(&engine, &log, "y-nested", priority::DEFAULT);
            }
            record(&engine, &log, "x-2", priority::DEFAULT);
        }
        // Sibling context
        let _z = engine.enter("app:z");
        record(&engine, &log, "z", priority::DEFAULT);
    }
    // Re-entering the same name later adds to the same owner
    engine.with_context("app:x", || record(&engine, &log, "x-3", priority::HIGH));

    assert_eq!(engine.clear_all("app:x"), 4);

    STEP.run(&engine, &()).unwrap();
    assert_eq!(*log.lock(), ["root", "plugins", "y-nested", "z"]);
    assert!(collect_items(&engine).is_empty());

    let mut contexts: Vec<String> = engine.contexts().iter().map(ToString::to_string).collect();
    contexts.sort();
    assert_eq!(contexts, ["app:y", "app:z", "plugins"]);

    // Clearing again is a no-op
    assert_eq!(engine.clear_all("app:x"), 0);
    assert_eq!(engine.clear_all("never-entered"), 0);
}

#[test]
fn test_clear_all_spans_actions_and_filters() {
    let engine = Engine::new();
    engine.with_context("app:x", || {
        STEP.add(&engine, |_, ()| Ok(()));
        VALUE.add(&engine, |_, v, ()| Ok(v + 1));
        ITEMS.add_item(&engine, "x".to_string());
    });

    assert_eq!(engine.clear_all("app:x"), 3);
    assert!(!engine.has_callbacks(HookKind::Action, "test:step"));
    assert!(!engine.has_callbacks(HookKind::Filter, "x"));
    assert!(!engine.has_callbacks(HookKind::Filter, "test:items"));
}

#[test]
fn test_apply_without_callbacks_is_identity() {
    let engine = Engine::new();
    assert_eq!(VALUE.apply(&engine, 17, &()).unwrap(), 17);

    let list: Filter<Vec<String>, u8> = Filter::new("unused:list");
    let initial = vec!["kept".to_string()];
    assert_eq!(list.apply(&engine, initial.clone(), &0).unwrap(), initial);
}

#[test]
fn test_iterate_reflects_registrations_between_calls() {
    let engine = Engine::new();
    ITEMS.add_item(&engine, "first".to_string());

    let iter = ITEMS.iterate(&engine, &());
    let once: Vec<_> = iter.clone().collect::<Result<_>>().unwrap();
    let twice: Vec<_> = iter.replay().collect::<Result<_>>().unwrap();
    assert_eq!(once, ["first"]);
    assert_eq!(once, twice);

    ITEMS.add_item(&engine, "second".to_string());
    assert_eq!(collect_items(&engine), ["first", "second"]);

    // The earlier iterator keeps the entries it captured
    let stale: Vec<_> = iter.collect::<Result<_>>().unwrap();
    assert_eq!(stale, ["first"]);
}

#[test]
fn test_context_is_popped_on_error() {
    fn fails_inside(engine: &Engine) -> Result<()> {
        let _guard = engine.enter("app:broken");
        STEP.add(engine, |_, ()| Err("boom".into()));
        STEP.run(engine, &())?;
        Ok(())
    }

    let engine = Engine::new();
    let _outer = engine.enter("plugins");

    assert!(fails_inside(&engine).is_err());
    assert_eq!(engine.context_depth(), 1);
    assert_eq!(engine.current_context().unwrap(), "plugins");
}

#[test]
fn test_context_is_popped_on_panic() {
    let engine = Engine::new();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = engine.enter("app:panicking");
        panic!("extension crashed");
    }));

    assert!(result.is_err());
    assert_eq!(engine.context_depth(), 0);
    assert!(engine.current_context().is_none());
}

#[test]
fn test_guard_pops_most_recent_frame() {
    let engine = Engine::new();
    let outer = engine.enter("a");
    let inner = engine.enter("b");

    drop(outer);
    assert_eq!(engine.context_depth(), 1);
    assert_eq!(engine.current_context().unwrap(), "a");

    drop(inner);
    assert_eq!(engine.context_depth(), 0);
}

#[test]
fn test_filter_fold_scenario() {
    let engine = Engine::new();
    VALUE.add_with_priority(&engine, 10, |_, v, ()| Ok(v + 1));
    VALUE.add_with_priority(&engine, 20, |_, v, ()| Ok(v * 2));
    assert_eq!(VALUE.apply(&engine, 3, &()).unwrap(), 8);
}

#[test]
fn test_self_clearing_action_runs_snapshot() {
    const Y: Action = Action::new("y");

    let engine = Engine::new();
    let log: Log = Arc::default();

    let first = Arc::clone(&log);
    Y.add_with_priority(&engine, 10, move |engine, ()| -> CallbackResult<()> {
        first.lock().push("clearing".to_string());
        Y.clear(engine);
        Ok(())
    });
    let second = Arc::clone(&log);
    Y.add_with_priority(&engine, 20, move |_, ()| {
        second.lock().push("later".to_string());
        Ok(())
    });

    Y.run(&engine, &()).unwrap();
    assert_eq!(*log.lock(), ["clearing", "later"]);

    // The clear applies to the next dispatch
    Y.run(&engine, &()).unwrap();
    assert_eq!(log.lock().len(), 2);
    assert!(Y.entries(&engine).is_empty());
}

#[test]
fn test_registration_during_dispatch_applies_next_time() {
    let engine = Engine::new();
    let log: Log = Arc::default();

    let outer = Arc::clone(&log);
    STEP.add(&engine, move |engine, ()| {
        outer.lock().push("outer".to_string());
        let inner = Arc::clone(&outer);
        STEP.add(engine, move |_, ()| {
            inner.lock().push("inner".to_string());
            Ok(())
        });
        Ok(())
    });

    STEP.run(&engine, &()).unwrap();
    assert_eq!(*log.lock(), ["outer"]);

    STEP.run(&engine, &()).unwrap();
    assert_eq!(*log.lock(), ["outer", "outer", "inner"]);
}

#[test]
fn test_mid_iteration_registration_is_not_seen() {
    let engine = Engine::new();
    ITEMS.add_item(&engine, "a".to_string());
    ITEMS.add_item(&engine, "b".to_string());

    let mut iter = ITEMS.iterate(&engine, &());
    assert_eq!(iter.next().unwrap().unwrap(), "a");

    ITEMS.add_item(&engine, "c".to_string());
    let rest: Vec<_> = iter.collect::<Result<_>>().unwrap();
    assert_eq!(rest, ["b"]);

    assert_eq!(collect_items(&engine), ["a", "b", "c"]);
}

#[test]
fn test_template_filters_are_isolated() {
    let engine = Engine::new();
    FAMILY.get(&engine, "a").unwrap().add(&engine, |_, v, ()| Ok(v + 1));
    FAMILY.get(&engine, "b").unwrap().add(&engine, |_, v, ()| Ok(v + 100));

    let a = FAMILY.get(&engine, "a").unwrap();
    assert_eq!(a.name(), "p:a");
    assert_eq!(a.apply(&engine, 0, &()).unwrap(), 1);
    assert_eq!(a.entries(&engine).len(), 1);

    // An unrelated concrete name is its own table too
    assert_eq!(VALUE.apply(&engine, 0, &()).unwrap(), 0);
}

#[test]
fn test_malformed_template_fails_at_instantiation() {
    let engine = Engine::new();
    for pattern in ["p", "p:{0}:{0}", "p:{1}", "p:{0"] {
        let template: FilterTemplate<i64> = FilterTemplate::new(pattern);
        assert!(template.get(&engine, "a").is_err(), "{pattern} should be rejected");
    }
}

#[test]
fn test_duplicate_results_are_deduplicated_by_consumers() {
    let engine = Engine::new();
    ITEMS.add_items(&engine, vec!["b".to_string(), "a".to_string()]);
    ITEMS.add_item(&engine, "b".to_string());

    assert_eq!(collect_items(&engine), ["b", "a", "b"]);
    let unique = try_sorted_unique(ITEMS.iterate(&engine, &())).unwrap();
    assert_eq!(unique, ["a", "b"]);
}

#[test]
fn test_context_stacks_are_per_thread() {
    let engine = Arc::new(Engine::new());
    let _guard = engine.enter("main-thread");

    let worker = Arc::clone(&engine);
    let seen = std::thread::spawn(move || {
        let before = worker.current_context();
        let _guard = worker.enter("worker");
        STEP.add(&worker, |_, ()| Ok(()));
        before
    })
    .join()
    .unwrap();

    assert!(seen.is_none());
    assert_eq!(engine.current_context().unwrap(), "main-thread");
    let owners: Vec<_> = STEP
        .entries(&engine)
        .into_iter()
        .filter_map(|e| e.context)
        .collect();
    assert_eq!(owners, ["worker"]);
}

#[test]
fn test_reset_isolates_tests() {
    let engine = Engine::new();
    engine.with_context("app:x", || ITEMS.add_item(&engine, "x".to_string()));
    FAMILY.get(&engine, "a").unwrap();

    engine.reset();
    assert!(collect_items(&engine).is_empty());
    assert!(engine.hook_names(HookKind::Filter).is_empty());
    assert!(engine.contexts().is_empty());
}
