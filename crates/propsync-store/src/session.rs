//! PropertySession: one login session's property state.
//!
//! Owns the store, the schema, the subscription registry and the applier.
//! Constructed at session start, bulk-loaded from the server snapshot, then
//! fed change events; dropped at teardown.

use serde_json::{Map, Value};

use propsync_core::errors::{ConfigError, PathError, SnapshotError};
use propsync_core::{
    bulk_load_span, ApplyOutcome, ChangeNotification, PropertyEvent, PropertyPath,
    PropertySchema, PropertyValue, PropsyncConfig, PropsyncResult, RawPropertyEvent,
};

use crate::applier::{ApplierOptions, BatchReport, EventApplier};
use crate::registry::{SubscriptionHandle, SubscriptionRegistry};
use crate::store::PropertyStore;

#[derive(Debug)]
pub struct PropertySession {
    store: PropertyStore,
    schema: PropertySchema,
    registry: SubscriptionRegistry,
    applier: EventApplier,
    validate_snapshot: bool,
}

impl PropertySession {
    /// A session with default applier options.
    pub fn new(schema: PropertySchema) -> Self {
        Self {
            store: PropertyStore::new(),
            schema,
            registry: SubscriptionRegistry::new(),
            applier: EventApplier::default(),
            validate_snapshot: false,
        }
    }

    /// A session built from resolved configuration.
    pub fn from_config(config: &PropsyncConfig) -> Result<Self, ConfigError> {
        let schema = config.build_schema()?;
        let mut session = Self::new(schema);
        session.applier = EventApplier::from_config(&config.applier);
        session.validate_snapshot = config.applier.effective_validate_snapshot();
        Ok(session)
    }

    /// Builder-style override of the applier options.
    pub fn with_options(mut self, options: ApplierOptions) -> Self {
        self.applier = EventApplier::new(options);
        self
    }

    /// Reject snapshots containing leaves the schema does not declare.
    pub fn with_snapshot_validation(mut self, enabled: bool) -> Self {
        self.validate_snapshot = enabled;
        self
    }

    /// Replace the store contents with the server snapshot.
    ///
    /// Subscribers are not notified. On error the previous contents stay.
    pub fn bulk_load(&mut self, snapshot: Map<String, Value>) -> Result<usize, SnapshotError> {
        let span = bulk_load_span!(snapshot.len());
        let _guard = span.enter();

        let mut staged = PropertyStore::new();
        let loaded = staged.bulk_load(snapshot)?;
        if self.validate_snapshot {
            for (path, value) in staged.leaves() {
                if !self.schema.contains(&path) {
                    tracing::warn!(%path, "snapshot leaf unknown to schema");
                    return Err(SnapshotError::UnknownProperty {
                        path: path.to_dotted(),
                    });
                }
                if let Err(e) = self.schema.check(&path, &value) {
                    tracing::warn!(error = %e, "snapshot leaf does not fit schema");
                    return Err(SnapshotError::Schema(e));
                }
            }
        }
        self.store = staged;
        tracing::info!(leaves = loaded, "snapshot loaded");
        Ok(loaded)
    }

    /// [`bulk_load`](Self::bulk_load) from a JSON document whose top level is an object.
    pub fn bulk_load_json(&mut self, json: &str) -> Result<usize, SnapshotError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| SnapshotError::Parse(e.to_string()))?;
        match value {
            Value::Object(map) => self.bulk_load(map),
            other => Err(SnapshotError::Parse(format!(
                "snapshot must be a JSON object, got {}",
                propsync_core::value::json_type_name(&other)
            ))),
        }
    }

    /// Apply a validated event and notify subscribers if it changed the store.
    pub fn apply(&mut self, event: &PropertyEvent) -> PropsyncResult<ApplyOutcome> {
        let outcome = self.applier.apply(&mut self.store, &self.schema, event)?;
        if let ApplyOutcome::Applied(change) = &outcome {
            self.registry.notify(change);
        }
        Ok(outcome)
    }

    /// Apply a wire event and notify subscribers if it changed the store.
    pub fn apply_raw(&mut self, raw: RawPropertyEvent) -> PropsyncResult<ApplyOutcome> {
        let outcome = self.applier.apply_raw(&mut self.store, &self.schema, raw)?;
        if let ApplyOutcome::Applied(change) = &outcome {
            self.registry.notify(change);
        }
        Ok(outcome)
    }

    /// Apply a wire event that may carry a whole property document.
    ///
    /// See [`PropertyEvent::expand_raw`]. A malformed document fails before
    /// anything is applied. The leaf events are then applied in order, each
    /// notifying on its own, and their failures are collected in the report.
    pub fn apply_document(&mut self, raw: RawPropertyEvent) -> PropsyncResult<BatchReport> {
        let events = PropertyEvent::expand_raw(raw)?;
        if events.len() > 1 {
            tracing::debug!(leaves = events.len(), "property document expanded");
        }
        let mut report = BatchReport::new();
        for (index, event) in events.iter().enumerate() {
            let result = self.apply(event);
            report.record(index, result);
        }
        Ok(report)
    }

    /// Apply wire events in order. Failures are collected, never fatal.
    pub fn apply_batch<I>(&mut self, events: I) -> BatchReport
    where
        I: IntoIterator<Item = RawPropertyEvent>,
    {
        let registry = &self.registry;
        self.applier
            .apply_batch(&mut self.store, &self.schema, events, |change| {
                registry.notify(change);
            })
    }

    pub fn get(&self, path: &PropertyPath) -> Option<PropertyValue> {
        self.store.get(path)
    }

    /// [`get`](Self::get) with a dotted key.
    pub fn get_raw(&self, key: &str) -> Result<Option<PropertyValue>, PathError> {
        Ok(self.store.get(&PropertyPath::parse(key)?))
    }

    /// A deep copy of the whole tree.
    pub fn get_all(&self) -> Map<String, Value> {
        self.store.get_all()
    }

    /// The stored value, or the schema default when the leaf is absent.
    pub fn get_or_default(&self, path: &PropertyPath) -> Option<PropertyValue> {
        self.schema.value_or_default(self.store.get(path), path)
    }

    pub fn subscribe<F>(&self, path: PropertyPath, callback: F) -> SubscriptionHandle
    where
        F: Fn(&ChangeNotification) + 'static,
    {
        self.registry.subscribe(path, callback)
    }

    pub fn subscribe_raw<F>(&self, key: &str, callback: F) -> Result<SubscriptionHandle, PathError>
    where
        F: Fn(&ChangeNotification) + 'static,
    {
        self.registry.subscribe_raw(key, callback)
    }

    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.registry.unsubscribe(handle)
    }

    /// A clone of the registry handle, for callbacks that manage subscriptions.
    pub fn registry(&self) -> SubscriptionRegistry {
        self.registry.clone()
    }

    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    pub fn store(&self) -> &PropertyStore {
        &self.store
    }
}
