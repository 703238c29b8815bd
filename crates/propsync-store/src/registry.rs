//! SubscriptionRegistry: synchronous change notification per property path.
//!
//! A subscriber registers on any path, leaf or interior. A change to a leaf
//! notifies the subscribers of every ancestor (coarse to fine) and then of
//! the leaf itself, in registration order at each path.
//!
//! The registry is a cheap-clone handle over `Rc<RefCell<..>>`. Callbacks may
//! hold a clone and subscribe or unsubscribe from inside a notification: the
//! subscriber list is snapshotted before the first callback runs and no
//! borrow is held while callbacks execute.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use propsync_core::errors::PathError;
use propsync_core::{notify_span, AppliedChange, ChangeNotification, PropertyPath};

type Callback = Rc<dyn Fn(&ChangeNotification)>;

/// Identifies one subscription. Never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

struct Entry {
    handle: SubscriptionHandle,
    callback: Callback,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    by_path: BTreeMap<PropertyPath, Vec<Entry>>,
}

/// Shared, single-threaded subscription registry.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    inner: Rc<RefCell<Inner>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for changes at or below `path`.
    pub fn subscribe<F>(&self, path: PropertyPath, callback: F) -> SubscriptionHandle
    where
        F: Fn(&ChangeNotification) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let handle = SubscriptionHandle(inner.next_id);
        inner.next_id += 1;
        inner.by_path.entry(path).or_default().push(Entry {
            handle,
            callback: Rc::new(callback),
        });
        handle
    }

    /// [`subscribe`](Self::subscribe) with a dotted key.
    pub fn subscribe_raw<F>(&self, key: &str, callback: F) -> Result<SubscriptionHandle, PathError>
    where
        F: Fn(&ChangeNotification) + 'static,
    {
        let path = PropertyPath::parse(key)?;
        Ok(self.subscribe(path, callback))
    }

    /// Remove a subscription. Returns false if the handle is unknown.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut inner = self.inner.borrow_mut();
        let mut emptied = None;
        let mut found = false;
        for (path, entries) in inner.by_path.iter_mut() {
            if let Some(pos) = entries.iter().position(|e| e.handle == handle) {
                entries.remove(pos);
                found = true;
                if entries.is_empty() {
                    emptied = Some(path.clone());
                }
                break;
            }
        }
        if let Some(path) = emptied {
            inner.by_path.remove(&path);
        }
        found
    }

    /// Total number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().by_path.values().map(Vec::len).sum()
    }

    /// Subscriptions registered exactly on `path`.
    pub fn subscriber_count_for(&self, path: &PropertyPath) -> usize {
        self.inner
            .borrow()
            .by_path
            .get(path)
            .map_or(0, Vec::len)
    }

    /// Notify everyone subscribed to `change.path` or one of its ancestors.
    ///
    /// Callbacks that panic are caught and logged; later subscribers still
    /// run. Returns the number of callbacks invoked.
    pub fn notify(&self, change: &AppliedChange) -> usize {
        let targets = self.snapshot(&change.path);
        if targets.is_empty() {
            return 0;
        }

        let span = notify_span!(change.path, targets.len());
        let _guard = span.enter();

        let notification = ChangeNotification::from(change);
        for (handle, callback) in &targets {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                callback(&notification);
            }));
            if result.is_err() {
                tracing::error!(
                    subscription = handle.id(),
                    path = %change.path,
                    "subscriber panicked during notification"
                );
            }
        }
        targets.len()
    }

    fn snapshot(&self, leaf: &PropertyPath) -> Vec<(SubscriptionHandle, Callback)> {
        let inner = self.inner.borrow();
        leaf.ancestors()
            .into_iter()
            .chain(std::iter::once(leaf.clone()))
            .filter_map(|path| inner.by_path.get(&path))
            .flat_map(|entries| {
                entries
                    .iter()
                    .map(|e| (e.handle, Rc::clone(&e.callback)))
            })
            .collect()
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SubscriptionRegistry")
            .field("paths", &inner.by_path.len())
            .field("subscribers", &inner.by_path.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propsync_core::PropertyValue;
    use std::cell::Cell;

    fn path(raw: &str) -> PropertyPath {
        PropertyPath::parse(raw).unwrap()
    }

    fn change(raw: &str) -> AppliedChange {
        AppliedChange {
            path: path(raw),
            old_value: None,
            new_value: Some(PropertyValue::from(true)),
            version: None,
        }
    }

    fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> impl Fn(&ChangeNotification) {
        let log = Rc::clone(log);
        move |n: &ChangeNotification| log.borrow_mut().push(format!("{tag}:{}", n.path))
    }

    #[test]
    fn ancestors_notified_coarse_to_fine_then_leaf() {
        let registry = SubscriptionRegistry::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        registry.subscribe(path("settings.privacy.improve_wire"), recorder(&log, "leaf"));
        registry.subscribe(path("settings.privacy"), recorder(&log, "mid"));
        registry.subscribe(path("settings"), recorder(&log, "root"));
        registry.subscribe(path("settings"), recorder(&log, "root2"));

        let called = registry.notify(&change("settings.privacy.improve_wire"));
        assert_eq!(called, 4);
        assert_eq!(
            *log.borrow(),
            vec![
                "root:settings.privacy.improve_wire",
                "root2:settings.privacy.improve_wire",
                "mid:settings.privacy.improve_wire",
                "leaf:settings.privacy.improve_wire",
            ]
        );
    }

    #[test]
    fn siblings_and_descendants_not_notified() {
        let registry = SubscriptionRegistry::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        registry.subscribe(path("settings.sound"), recorder(&log, "sibling"));
        registry.subscribe(path("settings.privacy.improve_wire.x"), recorder(&log, "below"));
        assert_eq!(registry.notify(&change("settings.privacy.improve_wire")), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn unsubscribe_unknown_handle_is_false() {
        let registry = SubscriptionRegistry::new();
        let handle = registry.subscribe(path("a"), |_| {});
        assert!(registry.unsubscribe(handle));
        assert!(!registry.unsubscribe(handle));
        assert_eq!(registry.subscriber_count(), 0);
    }

    #[test]
    fn handles_are_never_reused() {
        let registry = SubscriptionRegistry::new();
        let first = registry.subscribe(path("a"), |_| {});
        registry.unsubscribe(first);
        let second = registry.subscribe(path("a"), |_| {});
        assert_ne!(first, second);
    }

    #[test]
    fn subscribe_raw_rejects_malformed_key() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.subscribe_raw("a..b", |_| {}).is_err());
        assert!(registry.subscribe_raw("a.b", |_| {}).is_ok());
        assert_eq!(registry.subscriber_count_for(&path("a.b")), 1);
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let registry = SubscriptionRegistry::new();
        let calls = Rc::new(Cell::new(0));
        let slot: Rc<Cell<Option<SubscriptionHandle>>> = Rc::new(Cell::new(None));

        let handle = {
            let registry = registry.clone();
            let calls = Rc::clone(&calls);
            let slot = Rc::clone(&slot);
            registry.clone().subscribe(path("a"), move |_| {
                calls.set(calls.get() + 1);
                if let Some(me) = slot.get() {
                    registry.unsubscribe(me);
                }
            })
        };
        slot.set(Some(handle));

        registry.notify(&change("a"));
        registry.notify(&change("a"));
        assert_eq!(calls.get(), 1);
        assert_eq!(registry.subscriber_count(), 0);
    }

    #[test]
    fn subscriber_added_during_pass_waits_for_next_pass() {
        let registry = SubscriptionRegistry::new();
        let late_calls = Rc::new(Cell::new(0));
        {
            let registry_in = registry.clone();
            let late_calls = Rc::clone(&late_calls);
            registry.subscribe(path("a"), move |_| {
                let late_calls = Rc::clone(&late_calls);
                registry_in.subscribe(path("a"), move |_| late_calls.set(late_calls.get() + 1));
            });
        }

        assert_eq!(registry.notify(&change("a")), 1);
        assert_eq!(late_calls.get(), 0);
        assert_eq!(registry.notify(&change("a")), 2);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn subscriber_removed_during_pass_still_runs_in_it() {
        let registry = SubscriptionRegistry::new();
        let second_calls = Rc::new(Cell::new(0));
        let second_slot: Rc<Cell<Option<SubscriptionHandle>>> = Rc::new(Cell::new(None));
        {
            let registry_in = registry.clone();
            let second_slot = Rc::clone(&second_slot);
            registry.subscribe(path("a"), move |_| {
                if let Some(other) = second_slot.get() {
                    registry_in.unsubscribe(other);
                }
            });
        }
        let second = {
            let second_calls = Rc::clone(&second_calls);
            registry.subscribe(path("a"), move |_| second_calls.set(second_calls.get() + 1))
        };
        second_slot.set(Some(second));

        registry.notify(&change("a"));
        assert_eq!(second_calls.get(), 1);
        registry.notify(&change("a"));
        assert_eq!(second_calls.get(), 1);
    }

    #[test]
    fn panicking_subscriber_does_not_stop_others() {
        let registry = SubscriptionRegistry::new();
        let calls = Rc::new(Cell::new(0));
        registry.subscribe(path("a"), |_| panic!("subscriber failure"));
        {
            let calls = Rc::clone(&calls);
            registry.subscribe(path("a"), move |_| calls.set(calls.get() + 1));
        }
        assert_eq!(registry.notify(&change("a")), 2);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn notification_carries_old_and_new_values() {
        let registry = SubscriptionRegistry::new();
        let seen = Rc::new(RefCell::new(None));
        {
            let seen = Rc::clone(&seen);
            registry.subscribe(path("privacy"), move |n| *seen.borrow_mut() = Some(n.clone()));
        }
        registry.notify(&AppliedChange {
            path: path("privacy.receipt_mode"),
            old_value: Some(PropertyValue::from(0i64)),
            new_value: None,
            version: None,
        });
        let seen = seen.borrow().clone().unwrap();
        assert_eq!(seen.path, path("privacy.receipt_mode"));
        assert_eq!(seen.old_value, Some(PropertyValue::from(0i64)));
        assert_eq!(seen.new_value, None);
    }
}
