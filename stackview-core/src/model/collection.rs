//! Collection model: record cache with field-level dirty tracking
//!
//! One model backs one screen. It reads records through the [`ObjectStore`],
//! records local mutations per field, and produces the minimal partial records
//! to send back on save. It never writes to the store itself.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, watch, RwLock};

use crate::error::CoreError;
use crate::traits::ObjectStore;
use crate::types::{EntitySchema, FetchRequest, FieldValues, Record, RecordId};

/// Fields copied verbatim into every change set for optimistic-concurrency checks
const CONCURRENCY_FIELDS: &[&str] = &["modified", "state"];

/// Id given to records added without one
const UNSAVED_ID: RecordId = 0;

/// Notification sent to the owning screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    /// Records were replaced; `full` asks for a complete re-render
    DataChanged { full: bool },
}

#[derive(Debug, Default)]
struct CollectionState {
    objects: Vec<Record>,
    /// Record id → names of fields mutated since the last server acknowledgment
    dirty: HashMap<RecordId, BTreeSet<String>>,
    total: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct LoadState {
    in_flight: usize,
    settled: u64,
}

impl LoadState {
    fn is_loaded(self) -> bool {
        self.settled > 0 && self.in_flight == 0
    }
}

/// Record cache for one screen's domain and projection
pub struct CollectionModel {
    store: Arc<dyn ObjectStore>,
    schema: Arc<EntitySchema>,
    request: FetchRequest,
    state: RwLock<CollectionState>,
    load: watch::Sender<LoadState>,
    events: broadcast::Sender<ModelEvent>,
}

impl CollectionModel {
    /// Create an empty, not yet loaded model
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        schema: Arc<EntitySchema>,
        request: FetchRequest,
    ) -> Self {
        let (load, _) = watch::channel(LoadState::default());
        let (events, _) = broadcast::channel(16);
        Self {
            store,
            schema,
            request,
            state: RwLock::new(CollectionState::default()),
            load,
            events,
        }
    }

    #[must_use]
    pub fn entity(&self) -> &str {
        &self.request.entity
    }

    #[must_use]
    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    #[must_use]
    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    /// Subscribe to data-changed notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ModelEvent> {
        self.events.subscribe()
    }

    /// Whether at least one fetch has settled and none is in flight
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.load.borrow().is_loaded()
    }

    /// Re-read the records matching the domain.
    ///
    /// A transport failure leaves the model empty instead of surfacing an error.
    /// Dirty tracking survives the refresh, except for records that are no longer
    /// present. Overlapping refreshes are not sequenced: the last one to settle wins.
    pub async fn refresh(&self, full: bool) {
        self.load.send_modify(|load| load.in_flight += 1);

        let outcome = self.store.fetch(&self.request).await;
        {
            let mut state = self.state.write().await;
            match outcome {
                Ok(page) => {
                    log::debug!(
                        "Fetched {} of {} {} records",
                        page.records.len(),
                        page.total,
                        self.request.entity
                    );
                    state.objects = page.records;
                    state.total = page.total;
                }
                Err(e) => {
                    e.log(&format!("Failed to fetch {} records", self.request.entity));
                    state.objects.clear();
                    state.total = 0;
                }
            }

            let present: HashSet<RecordId> =
                state.objects.iter().filter_map(Record::id).collect();
            state.dirty.retain(|id, _| present.contains(id));
        }

        self.load.send_modify(|load| {
            load.in_flight -= 1;
            load.settled += 1;
        });
        self.notify(full);
    }

    /// Records held by the model, or the subset matching `ids`.
    ///
    /// Waits until the first fetch has settled and no fetch is in flight.
    pub async fn get(&self, ids: &[RecordId]) -> Vec<Record> {
        let mut load = self.load.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = load.wait_for(|state| state.is_loaded()).await;

        let state = self.state.read().await;
        if ids.is_empty() {
            return state.objects.clone();
        }
        state
            .objects
            .iter()
            .filter(|record| record.id().is_some_and(|id| ids.contains(&id)))
            .cloned()
            .collect()
    }

    /// Assign `values` to every record in `ids` and mark those fields dirty.
    ///
    /// Fields unknown to the entity schema are ignored, and `id` is never assigned.
    pub async fn change(&self, ids: &[RecordId], values: &FieldValues) {
        let mut state = self.state.write().await;
        let CollectionState { objects, dirty, .. } = &mut *state;

        for record in objects.iter_mut() {
            let Some(id) = record.id().filter(|id| ids.contains(id)) else {
                continue;
            };
            for (field, value) in values {
                if field == "id" || !self.schema.contains(field) {
                    continue;
                }
                record.insert(field.clone(), value.clone());
                dirty.entry(id).or_default().insert(field.clone());
            }
        }
    }

    /// Apply a server-accepted update: clear dirtiness for `id` and overwrite
    /// the given fields with the server's values.
    pub async fn reset(&self, id: RecordId, values: &FieldValues) {
        let mut state = self.state.write().await;
        state.dirty.remove(&id);

        match state.objects.iter_mut().find(|record| record.id() == Some(id)) {
            Some(record) => {
                for (field, value) in values {
                    record.insert(field.clone(), value.clone());
                }
            }
            None => log::debug!("Reset for {} {id} which is not loaded", self.request.entity),
        }
    }

    /// Append a record; a missing id becomes `0`. Malformed or duplicate records are
    /// logged and dropped.
    pub async fn add(&self, record: Value) {
        let mut record = match Record::from_value(record) {
            Ok(record) => record,
            Err(e) => {
                e.log(&format!("Rejected new {} record", self.request.entity));
                return;
            }
        };
        if record.get("id").is_none() {
            record.set_id(UNSAVED_ID);
        }
        let Some(id) = record.id() else {
            log::warn!("Rejected new {} record: id is not an integer", self.request.entity);
            return;
        };

        let mut state = self.state.write().await;
        if state.objects.iter().any(|existing| existing.id() == Some(id)) {
            CoreError::DuplicateRecord(id)
                .log(&format!("Rejected new {} record", self.request.entity));
            return;
        }
        state.objects.push(record);
        state.total += 1;
    }

    /// Replace every record in `ids` with a copy of `record`. Each replaced record
    /// keeps its own id.
    pub async fn set(&self, ids: &[RecordId], record: Value) {
        let record = match Record::from_value(record) {
            Ok(record) => record,
            Err(e) => {
                e.log(&format!("Rejected {} replacement", self.request.entity));
                return;
            }
        };

        {
            let mut state = self.state.write().await;
            for existing in &mut state.objects {
                let Some(id) = existing.id().filter(|id| ids.contains(id)) else {
                    continue;
                };
                let mut replacement = record.clone();
                replacement.set_id(id);
                *existing = replacement;
            }
        }
        self.notify(false);
    }

    /// Partial records for every dirty record (optionally restricted to `ids`):
    /// the id, the dirty fields serialized for write, and `modified`/`state`
    /// verbatim when present.
    pub async fn get_changes(&self, ids: &[RecordId]) -> Vec<Record> {
        let state = self.state.read().await;
        let mut changes = Vec::new();

        for record in &state.objects {
            let Some(id) = record.id() else { continue };
            if !ids.is_empty() && !ids.contains(&id) {
                continue;
            }
            let Some(fields) = state.dirty.get(&id).filter(|fields| !fields.is_empty()) else {
                continue;
            };

            let mut change = Record::with_id(id);
            for field in fields {
                let value = record.get(field).cloned().unwrap_or(Value::Null);
                let field_type = self.schema.resolve_type(field);
                change.insert(field.clone(), field_type.serialize_for_write(&value));
            }
            for field in CONCURRENCY_FIELDS {
                if let Some(value) = record.get(field) {
                    change.insert(*field, value.clone());
                }
            }
            changes.push(change);
        }
        changes
    }

    /// Whether any record has a non-empty dirty set
    pub async fn is_dirty(&self) -> bool {
        self.state
            .read()
            .await
            .dirty
            .values()
            .any(|fields| !fields.is_empty())
    }

    /// Server-reported count of matching records
    pub async fn total(&self) -> u64 {
        self.state.read().await.total
    }

    fn notify(&self, full: bool) {
        // No subscriber is fine: nobody renders this model yet.
        let _ = self.events.send(ModelEvent::DataChanged { full });
    }
}
