//! Test helper module
//!
//! Provides mock collaborators and convenient factory methods.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{Notify, RwLock};

use crate::context::NavigationContext;
use crate::error::{CoreError, CoreResult};
use crate::model::CollectionModel;
use crate::navigation::{Breadcrumb, NavigationConfig, NavigationStack};
use crate::traits::{DisplaySurface, HistoryBoundary, ObjectStore, TextMeasure};
use crate::types::{
    Domain, EntitySchema, FetchPage, FetchRequest, FieldDef, FieldType, FieldValues,
    HistoryState, Record,
};
use crate::utils::{IdGenerator, ScreenId};

pub const FRAME_URL: &str = "https://admin.test/app";

// ===== MockObjectStore =====

pub struct MockObjectStore {
    schemas: RwLock<HashMap<String, EntitySchema>>,
    records: RwLock<HashMap<String, Vec<Record>>>,
    /// If Some, fetch returns this error
    fetch_error: RwLock<Option<String>>,
    /// If Some, create returns this error
    create_error: RwLock<Option<String>>,
    /// If Some, fetch waits for a notification before answering
    fetch_gate: RwLock<Option<Arc<Notify>>>,
    fetches: RwLock<Vec<FetchRequest>>,
    creates: RwLock<Vec<(String, FieldValues)>>,
    next_id: AtomicI64,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self {
            schemas: RwLock::new(HashMap::new()),
            records: RwLock::new(HashMap::new()),
            fetch_error: RwLock::new(None),
            create_error: RwLock::new(None),
            fetch_gate: RwLock::new(None),
            fetches: RwLock::new(Vec::new()),
            creates: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(100),
        }
    }

    pub async fn add_schema(&self, entity: &str, schema: EntitySchema) {
        self.schemas.write().await.insert(entity.to_string(), schema);
    }

    pub async fn set_records(&self, entity: &str, records: Vec<Record>) {
        self.records.write().await.insert(entity.to_string(), records);
    }

    pub async fn set_fetch_error(&self, err: Option<String>) {
        *self.fetch_error.write().await = err;
    }

    pub async fn set_create_error(&self, err: Option<String>) {
        *self.create_error.write().await = err;
    }

    pub async fn set_fetch_gate(&self, gate: Option<Arc<Notify>>) {
        *self.fetch_gate.write().await = gate;
    }

    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }

    pub async fn fetches_for(&self, entity: &str) -> Vec<FetchRequest> {
        self.fetches
            .read()
            .await
            .iter()
            .filter(|request| request.entity == entity)
            .cloned()
            .collect()
    }

    pub async fn creates(&self) -> Vec<(String, FieldValues)> {
        self.creates.read().await.clone()
    }
}

/// Only `=` conditions are evaluated; every other operator matches.
fn matches(record: &Record, domain: &Domain) -> bool {
    if domain.is_empty() {
        return true;
    }
    domain.clauses().iter().any(|clause| {
        clause.conditions().iter().all(|condition| {
            condition.operator != "="
                || record.get(&condition.operand) == Some(&condition.value)
        })
    })
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn fetch(&self, request: &FetchRequest) -> CoreResult<FetchPage> {
        self.fetches.write().await.push(request.clone());

        let gate = self.fetch_gate.read().await.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(ref msg) = *self.fetch_error.read().await {
            return Err(CoreError::Transport(msg.clone()));
        }

        let store = self.records.read().await;
        let records: Vec<Record> = store
            .get(&request.entity)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| matches(record, &request.domain))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        let total = records.len() as u64;
        Ok(FetchPage { records, total })
    }

    async fn create(&self, entity: &str, defaults: &FieldValues) -> CoreResult<Record> {
        if let Some(ref msg) = *self.create_error.read().await {
            return Err(CoreError::Transport(msg.clone()));
        }
        self.creates
            .write()
            .await
            .push((entity.to_string(), defaults.clone()));

        let mut record = Record::new(defaults.clone());
        record.set_id(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.records
            .write()
            .await
            .entry(entity.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn schema(&self, entity: &str) -> CoreResult<EntitySchema> {
        self.schemas
            .read()
            .await
            .get(entity)
            .cloned()
            .ok_or_else(|| CoreError::EntityNotFound(entity.to_string()))
    }
}

// ===== RecordingHistory =====

pub struct RecordingHistory {
    states: Mutex<Vec<HistoryState>>,
}

impl RecordingHistory {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(Vec::new()),
        }
    }

    pub fn states(&self) -> Vec<HistoryState> {
        self.states.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.states.lock().unwrap().len()
    }
}

impl HistoryBoundary for RecordingHistory {
    fn push(&self, state: HistoryState) {
        self.states.lock().unwrap().push(state);
    }
}

// ===== RecordingSurface =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Show(ScreenId),
    Hide(ScreenId),
    Dispose(ScreenId),
    Busy(bool),
    Breadcrumb(String),
}

pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Breadcrumb most recently rendered, if any
    pub fn last_breadcrumb(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|event| match event {
            SurfaceEvent::Breadcrumb(text) => Some(text),
            _ => None,
        })
    }

    fn record(&self, event: SurfaceEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl DisplaySurface for RecordingSurface {
    fn show(&self, screen: ScreenId) {
        self.record(SurfaceEvent::Show(screen));
    }

    fn hide(&self, screen: ScreenId) {
        self.record(SurfaceEvent::Hide(screen));
    }

    fn dispose(&self, screen: ScreenId) {
        self.record(SurfaceEvent::Dispose(screen));
    }

    fn set_busy(&self, busy: bool) {
        self.record(SurfaceEvent::Busy(busy));
    }

    fn render_breadcrumb(&self, breadcrumb: &Breadcrumb) {
        self.record(SurfaceEvent::Breadcrumb(breadcrumb.render(" / ")));
    }
}

// ===== CharMeasure =====

/// One unit per character
pub struct CharMeasure;

impl TextMeasure for CharMeasure {
    fn width(&self, text: &str) -> usize {
        text.chars().count()
    }
}

// ===== Factory methods =====

/// Field mapping from a `json!` object literal
pub fn values(value: Value) -> FieldValues {
    match value {
        Value::Object(map) => map,
        _ => FieldValues::new(),
    }
}

pub fn product_schema() -> EntitySchema {
    EntitySchema::new()
        .with_field("id", FieldDef::plain(FieldType::Integer))
        .with_field("name", FieldDef::plain(FieldType::Char))
        .with_field("title", FieldDef::alias("name"))
        .with_field(
            "category_id",
            FieldDef::plain(FieldType::Relation {
                entity: "category".to_string(),
            }),
        )
        .with_field("price", FieldDef::plain(FieldType::Float))
        .with_field("released", FieldDef::plain(FieldType::Date))
        .with_field("margin", FieldDef::computed(FieldType::Float))
        .with_field("modified", FieldDef::plain(FieldType::Datetime))
        .with_field("state", FieldDef::plain(FieldType::Selection))
        .with_link("/product/{id}")
}

pub fn sample_products() -> Vec<Record> {
    vec![
        Record::new(values(json!({
            "id": 1, "name": "Desk", "category_id": 5, "price": 120.0,
            "released": "2024-01-10", "modified": "2024-02-01T10:00:00", "state": "active"
        }))),
        Record::new(values(json!({
            "id": 2, "name": "Chair", "category_id": 5, "price": 45.5,
            "released": "", "modified": "2024-02-02T09:30:00", "state": "active"
        }))),
        Record::new(values(json!({
            "id": 3, "name": "Lamp", "category_id": 7, "price": 19.9
        }))),
    ]
}

/// Store knowing `home`, `product` and `category`, with three products
pub async fn create_test_store() -> Arc<MockObjectStore> {
    let store = Arc::new(MockObjectStore::new());
    store
        .add_schema(
            "home",
            EntitySchema::new().with_field("name", FieldDef::plain(FieldType::Char)),
        )
        .await;
    store.add_schema("product", product_schema()).await;
    store
        .add_schema(
            "category",
            EntitySchema::new().with_field("name", FieldDef::plain(FieldType::Char)),
        )
        .await;
    store.set_records("product", sample_products()).await;
    store
        .set_records(
            "category",
            vec![
                Record::new(values(json!({"id": 5, "name": "Office"}))),
                Record::new(values(json!({"id": 7, "name": "Lighting"}))),
            ],
        )
        .await;
    store
}

/// Model over every product
pub fn create_product_model(store: Arc<MockObjectStore>) -> CollectionModel {
    let schema = Arc::new(product_schema());
    let request = FetchRequest {
        entity: "product".to_string(),
        fields: schema.field_names(),
        domain: Domain::new(),
        controller: None,
        extra: FieldValues::new(),
    };
    CollectionModel::new(store, schema, request)
}

pub fn test_config() -> NavigationConfig {
    NavigationConfig {
        frame_url: FRAME_URL.to_string(),
        ..NavigationConfig::default()
    }
}

/// Create a test `NavigationStack` with nothing opened yet
pub async fn create_test_stack() -> (
    NavigationStack,
    Arc<MockObjectStore>,
    Arc<RecordingHistory>,
    Arc<RecordingSurface>,
) {
    let store = create_test_store().await;
    let history = Arc::new(RecordingHistory::new());
    let surface = Arc::new(RecordingSurface::new());

    let ctx = Arc::new(NavigationContext::new(
        store.clone(),
        history.clone(),
        surface.clone(),
        Arc::new(CharMeasure),
        Arc::new(IdGenerator::new()),
    ));
    (
        NavigationStack::new(ctx, test_config()),
        store,
        history,
        surface,
    )
}
