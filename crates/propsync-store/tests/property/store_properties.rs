use std::cell::Cell;
use std::rc::Rc;

use propsync_core::{
    ApplyOutcome, NoOpReason, PropertyEvent, PropertyPath, PropertySchema, PropertyValue,
};
use propsync_store::{PropertySession, PropertyStore};
use proptest::prelude::*;
use serde_json::{Map, Value};

const BOOL_PATHS: [&str; 4] = [
    "settings.call.enable_soundless_incoming_calls",
    "settings.emoji.replace_inline",
    "settings.previews.send",
    "settings.interface.view_folders",
];

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

fn tree() -> impl Strategy<Value = Map<String, Value>> {
    let node = scalar().prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map("[a-d]{1,3}", inner, 0..4)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    });
    prop::collection::btree_map("[a-d]{1,3}", node, 0..5).prop_map(|m| m.into_iter().collect())
}

fn path(raw: &str) -> PropertyPath {
    PropertyPath::parse(raw).unwrap()
}

/// (path index, `Some(value)` for set or `None` for delete, version)
fn event() -> impl Strategy<Value = (usize, Option<bool>, Option<u64>)> {
    (
        0..BOOL_PATHS.len(),
        prop::option::of(any::<bool>()),
        prop::option::of(0u64..8),
    )
}

fn to_event((idx, value, version): (usize, Option<bool>, Option<u64>)) -> PropertyEvent {
    let p = path(BOOL_PATHS[idx]);
    match value {
        Some(v) => PropertyEvent::set(p, v, version),
        None => PropertyEvent::delete(p),
    }
}

proptest! {
    #[test]
    fn bulk_load_then_get_all_round_trips(snapshot in tree()) {
        let mut store = PropertyStore::new();
        store.bulk_load(snapshot.clone()).unwrap();
        prop_assert_eq!(store.get_all(), snapshot);
    }

    #[test]
    fn delete_is_idempotent(idx in 0..BOOL_PATHS.len(), preset in any::<bool>()) {
        let mut session = PropertySession::new(PropertySchema::webapp());
        let p = path(BOOL_PATHS[idx]);
        session.apply(&PropertyEvent::set(p.clone(), preset, Some(1))).unwrap();

        let first = session.apply(&PropertyEvent::delete(p.clone())).unwrap();
        prop_assert!(first.is_applied());
        let after_first = session.get_all();

        let second = session.apply(&PropertyEvent::delete(p.clone())).unwrap();
        prop_assert_eq!(second, ApplyOutcome::NoOp(NoOpReason::Absent));
        prop_assert_eq!(session.get_all(), after_first);
        prop_assert_eq!(session.get(&p), None);
    }

    #[test]
    fn highest_version_wins(writes in prop::collection::vec((any::<bool>(), 0u64..20), 1..30)) {
        let mut session = PropertySession::new(PropertySchema::webapp());
        let p = path("settings.previews.send");
        for (value, version) in &writes {
            session.apply(&PropertyEvent::set(p.clone(), *value, Some(*version))).unwrap();
        }

        let max = writes.iter().map(|(_, v)| *v).max().unwrap();
        let expected = writes.iter().rev().find(|(_, v)| *v == max).map(|(b, _)| *b).unwrap();
        prop_assert_eq!(session.get(&p), Some(PropertyValue::from(expected)));
        prop_assert_eq!(session.store().version_of(&p).map(|v| v.0), Some(max));
    }

    #[test]
    fn each_applied_change_notifies_exactly_once(events in prop::collection::vec(event(), 0..40)) {
        let mut session = PropertySession::new(PropertySchema::webapp());
        let calls = Rc::new(Cell::new(0usize));
        {
            let calls = Rc::clone(&calls);
            session.subscribe(path("settings"), move |_| calls.set(calls.get() + 1));
        }

        let mut applied = 0;
        for e in events {
            if session.apply(&to_event(e)).unwrap().is_applied() {
                applied += 1;
            }
        }
        prop_assert_eq!(calls.get(), applied);
    }
}
