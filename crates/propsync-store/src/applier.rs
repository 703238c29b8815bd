//! EventApplier: reconciles property events into the store.
//!
//! Conflict resolution is last-writer-by-version-wins per leaf. Every
//! rejection is local to its event: the store is left untouched and the
//! next event is applied as if the failed one never arrived.

use propsync_core::config::ApplierConfig;
use propsync_core::errors::ApplyError;
use propsync_core::{
    apply_span, AppliedChange, ApplyOutcome, NoOpReason, PropertyEvent, PropertyPath,
    PropertySchema, PropertyValue, PropsyncError, PropsyncResult, RawPropertyEvent, Version,
};

use crate::store::PropertyStore;
use crate::versioned::VersionedValue;

/// Knobs for the applier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplierOptions {
    /// Fail `set` events that carry no version with `ApplyError::UnversionedWrite`.
    pub reject_unversioned: bool,
}

impl ApplierOptions {
    pub fn from_config(config: &ApplierConfig) -> Self {
        Self {
            reject_unversioned: config.effective_reject_unversioned(),
        }
    }
}

/// One failed event in a batch.
#[derive(Debug)]
pub struct BatchFailure {
    /// Zero-based position of the event in the batch.
    pub index: usize,
    pub error: PropsyncError,
}

/// Result of a batch apply that accumulates per-event failures.
///
/// A failure never stops the batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Outcomes of the accepted events, with their batch index.
    pub outcomes: Vec<(usize, ApplyOutcome)>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of the event at `index`.
    pub fn record(&mut self, index: usize, result: PropsyncResult<ApplyOutcome>) {
        match result {
            Ok(outcome) => self.outcomes.push((index, outcome)),
            Err(error) => self.failures.push(BatchFailure { index, error }),
        }
    }

    /// Returns true if every event was accepted.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_applied()).count()
    }

    pub fn noop_count(&self) -> usize {
        self.outcomes.len() - self.applied_count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Number of events the batch contained.
    pub fn total(&self) -> usize {
        self.outcomes.len() + self.failures.len()
    }
}

/// Applies events to a [`PropertyStore`] under a [`PropertySchema`].
#[derive(Debug, Clone, Default)]
pub struct EventApplier {
    options: ApplierOptions,
}

impl EventApplier {
    pub fn new(options: ApplierOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &ApplierConfig) -> Self {
        Self::new(ApplierOptions::from_config(config))
    }

    pub fn options(&self) -> ApplierOptions {
        self.options
    }

    /// Apply one validated event.
    pub fn apply(
        &self,
        store: &mut PropertyStore,
        schema: &PropertySchema,
        event: &PropertyEvent,
    ) -> PropsyncResult<ApplyOutcome> {
        let span = apply_span!(event.kind(), event.path());
        let _guard = span.enter();

        let result = match event {
            PropertyEvent::Set {
                path,
                value,
                version,
            } => self.apply_set(store, schema, path, value, *version),
            PropertyEvent::Delete { path } => Self::apply_delete(store, schema, path),
        };

        match &result {
            Ok(ApplyOutcome::Applied(change)) => {
                tracing::debug!(version = ?change.version, "applied");
            }
            Ok(ApplyOutcome::NoOp(NoOpReason::Stale { current, incoming })) => {
                tracing::debug!(%current, %incoming, "stale event ignored");
            }
            Ok(ApplyOutcome::NoOp(reason)) => {
                tracing::trace!(?reason, "no-op");
            }
            Err(e) if e.is_schema_mismatch() => {
                tracing::warn!(error = %e, "unknown property; client and server schemas disagree");
            }
            Err(e) => {
                tracing::debug!(error = %e, "event rejected");
            }
        }
        result
    }

    /// Resolve, validate and apply a wire event in one step.
    pub fn apply_raw(
        &self,
        store: &mut PropertyStore,
        schema: &PropertySchema,
        raw: RawPropertyEvent,
    ) -> PropsyncResult<ApplyOutcome> {
        let event = match PropertyEvent::try_from_raw(raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(error = %e, "malformed event rejected");
                return Err(e);
            }
        };
        self.apply(store, schema, &event)
    }

    /// Apply `events` in order, collecting failures.
    ///
    /// `on_applied` runs after each event that changed the store, before
    /// the next event is applied.
    pub fn apply_batch<I, F>(
        &self,
        store: &mut PropertyStore,
        schema: &PropertySchema,
        events: I,
        mut on_applied: F,
    ) -> BatchReport
    where
        I: IntoIterator<Item = RawPropertyEvent>,
        F: FnMut(&AppliedChange),
    {
        let mut report = BatchReport::new();
        for (index, raw) in events.into_iter().enumerate() {
            let result = self.apply_raw(store, schema, raw);
            if let Ok(ApplyOutcome::Applied(change)) = &result {
                on_applied(change);
            }
            report.record(index, result);
        }
        report
    }

    fn apply_set(
        &self,
        store: &mut PropertyStore,
        schema: &PropertySchema,
        path: &PropertyPath,
        value: &PropertyValue,
        incoming: Option<Version>,
    ) -> PropsyncResult<ApplyOutcome> {
        schema.check(path, value)?;
        if incoming.is_none() && self.options.reject_unversioned {
            return Err(ApplyError::UnversionedWrite {
                path: path.to_dotted(),
            }
            .into());
        }

        let mut next = incoming;
        let mut unchanged = None;
        if let Some(held) = store.leaf(path) {
            if let Err(reason) = held.admits(incoming) {
                return Ok(ApplyOutcome::NoOp(reason));
            }
            next = held.next_version(incoming);
            if held.value() == value {
                unchanged = Some(held.version());
            }
        }

        if let Some(held_version) = unchanged {
            if held_version != next {
                store.write_leaf(path, VersionedValue::new(value.clone(), next))?;
            }
            return Ok(ApplyOutcome::NoOp(NoOpReason::Unchanged));
        }

        let old = store.write_leaf(path, VersionedValue::new(value.clone(), next))?;
        Ok(ApplyOutcome::Applied(AppliedChange {
            path: path.clone(),
            old_value: old.map(VersionedValue::into_value),
            new_value: Some(value.clone()),
            version: next,
        }))
    }

    fn apply_delete(
        store: &mut PropertyStore,
        schema: &PropertySchema,
        path: &PropertyPath,
    ) -> PropsyncResult<ApplyOutcome> {
        schema.lookup(path)?;
        match store.remove_leaf(path) {
            None => Ok(ApplyOutcome::NoOp(NoOpReason::Absent)),
            Some(old) => Ok(ApplyOutcome::Applied(AppliedChange {
                path: path.clone(),
                old_value: Some(old.into_value()),
                new_value: None,
                version: None,
            })),
        }
    }
}
