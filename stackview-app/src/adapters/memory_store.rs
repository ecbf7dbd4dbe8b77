//! In-memory object store
//!
//! Holds schemas and records per entity and evaluates domains locally.

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use stackview_core::error::{CoreError, CoreResult};
use stackview_core::types::{
    Condition, Domain, EntitySchema, FetchPage, FetchRequest, FieldValues, Record,
};
use stackview_core::ObjectStore;
use tokio::sync::RwLock;

/// Field stamped with the creation time of new records, when the schema has it
const MODIFIED_FIELD: &str = "modified";

#[derive(Default)]
struct EntityTable {
    schema: EntitySchema,
    records: Vec<Record>,
}

/// Object store kept entirely in memory.
///
/// Fetches apply the request domain and projection; `create` assigns
/// increasing ids starting after the highest id seen so far.
pub struct InMemoryObjectStore {
    tables: RwLock<HashMap<String, EntityTable>>,
    next_id: AtomicI64,
}

impl InMemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Register an entity with its schema and initial records.
    ///
    /// Registering an entity again replaces it.
    pub async fn register(&self, entity: &str, schema: EntitySchema, records: Vec<Record>) {
        let highest = records.iter().filter_map(Record::id).max().unwrap_or(0);
        self.next_id.fetch_max(highest + 1, Ordering::SeqCst);
        self.tables
            .write()
            .await
            .insert(entity.to_string(), EntityTable { schema, records });
        log::debug!("Registered entity {entity}");
    }

    /// Every record of an entity, unfiltered
    pub async fn records(&self, entity: &str) -> CoreResult<Vec<Record>> {
        self.tables
            .read()
            .await
            .get(entity)
            .map(|table| table.records.clone())
            .ok_or_else(|| CoreError::EntityNotFound(entity.to_string()))
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn fetch(&self, request: &FetchRequest) -> CoreResult<FetchPage> {
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.entity)
            .ok_or_else(|| CoreError::EntityNotFound(request.entity.clone()))?;

        let records: Vec<Record> = table
            .records
            .iter()
            .filter(|record| domain_matches(&request.domain, record))
            .map(|record| project(record, &request.fields))
            .collect();
        let total = records.len() as u64;
        log::debug!(
            "Fetched {total} {} record(s) for domain {}",
            request.entity,
            serde_json::to_string(&request.domain)?
        );
        Ok(FetchPage { records, total })
    }

    async fn create(&self, entity: &str, defaults: &FieldValues) -> CoreResult<Record> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(entity)
            .ok_or_else(|| CoreError::EntityNotFound(entity.to_string()))?;

        let mut record = Record::new(defaults.clone());
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        record.set_id(id);
        if table.schema.contains(MODIFIED_FIELD) {
            record.insert(
                MODIFIED_FIELD,
                Value::String(chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()),
            );
        }
        table.records.push(record.clone());
        log::info!("Created {entity} {id}");
        Ok(record)
    }

    async fn schema(&self, entity: &str) -> CoreResult<EntitySchema> {
        self.tables
            .read()
            .await
            .get(entity)
            .map(|table| table.schema.clone())
            .ok_or_else(|| CoreError::EntityNotFound(entity.to_string()))
    }
}

/// Keep `id` plus the requested fields; an empty projection keeps everything.
fn project(record: &Record, fields: &[String]) -> Record {
    if fields.is_empty() {
        return record.clone();
    }
    let projected = record
        .fields()
        .iter()
        .filter(|(name, _)| name.as_str() == "id" || fields.contains(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    Record::new(projected)
}

fn domain_matches(domain: &Domain, record: &Record) -> bool {
    if domain.is_empty() {
        return true;
    }
    domain.clauses().iter().any(|clause| {
        clause
            .conditions()
            .iter()
            .all(|condition| condition_matches(condition, record))
    })
}

fn condition_matches(condition: &Condition, record: &Record) -> bool {
    let actual = record.get(&condition.operand).unwrap_or(&Value::Null);
    let expected = &condition.value;
    match condition.operator.as_str() {
        "=" | "is" => loose_eq(actual, expected),
        "!=" | "is not" => !loose_eq(actual, expected),
        "in" => list_contains(expected, actual),
        "not in" => !list_contains(expected, actual),
        "like" => contains_text(actual, expected, false),
        "ilike" => contains_text(actual, expected, true),
        "<" => compare(actual, expected) == Some(CmpOrdering::Less),
        "<=" => matches!(
            compare(actual, expected),
            Some(CmpOrdering::Less | CmpOrdering::Equal)
        ),
        ">" => compare(actual, expected) == Some(CmpOrdering::Greater),
        ">=" => matches!(
            compare(actual, expected),
            Some(CmpOrdering::Greater | CmpOrdering::Equal)
        ),
        other => {
            log::warn!("Unsupported domain operator '{other}', condition ignored");
            true
        }
    }
}

/// Equality where `false` stands for an unset value and numbers compare by value
fn loose_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Null, Value::Bool(false)) | (Value::Bool(false), Value::Null) => true,
        (Value::Number(_), Value::Number(_)) => {
            compare(actual, expected) == Some(CmpOrdering::Equal)
        }
        _ => actual == expected,
    }
}

fn list_contains(list: &Value, actual: &Value) -> bool {
    match list {
        Value::Array(items) => items.iter().any(|item| loose_eq(actual, item)),
        single => loose_eq(actual, single),
    }
}

fn contains_text(actual: &Value, pattern: &Value, ignore_case: bool) -> bool {
    let (Some(text), Some(pattern)) = (actual.as_str(), pattern.as_str()) else {
        return false;
    };
    if ignore_case {
        text.to_lowercase().contains(&pattern.to_lowercase())
    } else {
        text.contains(pattern)
    }
}

fn compare(actual: &Value, expected: &Value) -> Option<CmpOrdering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stackview_core::types::{FieldDef, FieldType};

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    fn request(domain: Value) -> FetchRequest {
        FetchRequest {
            entity: "order".to_string(),
            fields: Vec::new(),
            domain: serde_json::from_value(domain).unwrap(),
            controller: None,
            extra: FieldValues::new(),
        }
    }

    async fn order_store() -> InMemoryObjectStore {
        let store = InMemoryObjectStore::new();
        let schema = EntitySchema::new()
            .with_field("name", FieldDef::plain(FieldType::Char))
            .with_field("amount", FieldDef::plain(FieldType::Float))
            .with_field("modified", FieldDef::plain(FieldType::Datetime));
        store
            .register(
                "order",
                schema,
                vec![
                    record(json!({"id": 4, "name": "SO004", "amount": 10})),
                    record(json!({"id": 9, "name": "SO009", "amount": 250.5})),
                    record(json!({"id": 12, "name": "PO012", "amount": 99})),
                ],
            )
            .await;
        store
    }

    async fn ids(store: &InMemoryObjectStore, domain: Value) -> Vec<i64> {
        store
            .fetch(&request(domain))
            .await
            .unwrap()
            .records
            .iter()
            .filter_map(Record::id)
            .collect()
    }

    #[tokio::test]
    async fn domains_are_evaluated() {
        let store = order_store().await;
        assert_eq!(ids(&store, json!([])).await, vec![4, 9, 12]);
        assert_eq!(ids(&store, json!([[["amount", ">", 50]]])).await, vec![9, 12]);
        assert_eq!(
            ids(&store, json!([[["name", "ilike", "so"], ["amount", "<", 100]]])).await,
            vec![4]
        );
        assert_eq!(
            ids(&store, json!([[["id", "=", 4]], [["id", "in", [12]]]])).await,
            vec![4, 12]
        );
        assert_eq!(ids(&store, json!([[["amount", "=", 10.0]]])).await, vec![4]);
    }

    #[tokio::test]
    async fn fetch_applies_projection() {
        let store = order_store().await;
        let mut req = request(json!([[["id", "=", 9]]]));
        req.fields = vec!["name".to_string()];

        let page = store.fetch(&req).await.unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.records[0], record(json!({"id": 9, "name": "SO009"})));
    }

    #[tokio::test]
    async fn create_assigns_fresh_id_and_stamp() {
        let store = order_store().await;
        let mut defaults = FieldValues::new();
        defaults.insert("name".to_string(), json!("SO013"));

        let created = store.create("order", &defaults).await.unwrap();

        assert_eq!(created.id(), Some(13));
        assert!(created.get("modified").is_some_and(Value::is_string));
        assert_eq!(store.records("order").await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn unknown_entity_is_reported() {
        let store = InMemoryObjectStore::new();
        assert!(matches!(
            store.schema("order").await,
            Err(CoreError::EntityNotFound(_))
        ));
        assert!(store.create("order", &FieldValues::new()).await.is_err());
    }
}
