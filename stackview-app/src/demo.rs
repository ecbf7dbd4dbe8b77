//! Sample catalog used by the `stackview` binary and the integration tests

use serde_json::{json, Value};
use stackview_core::error::CoreResult;
use stackview_core::types::{EntitySchema, FieldDef, FieldType, Record};

use crate::adapters::InMemoryObjectStore;

fn records(values: Vec<Value>) -> CoreResult<Vec<Record>> {
    values.into_iter().map(Record::from_value).collect()
}

#[must_use]
pub fn product_schema() -> EntitySchema {
    EntitySchema::new()
        .with_field("id", FieldDef::plain(FieldType::Integer))
        .with_field("name", FieldDef::plain(FieldType::Char))
        .with_field("display_name", FieldDef::alias("name"))
        .with_field(
            "category_id",
            FieldDef::plain(FieldType::Relation {
                entity: "category".to_string(),
            }),
        )
        .with_field("list_price", FieldDef::plain(FieldType::Float))
        .with_field("launch_date", FieldDef::plain(FieldType::Date))
        .with_field("modified", FieldDef::plain(FieldType::Datetime))
        .with_link("/product/{id}")
}

#[must_use]
pub fn category_schema() -> EntitySchema {
    EntitySchema::new()
        .with_field("id", FieldDef::plain(FieldType::Integer))
        .with_field("name", FieldDef::plain(FieldType::Char))
}

/// Register `home`, `category` and `product` with a handful of records
///
/// # Errors
/// Fails if a sample record is not a JSON object.
pub async fn seed(store: &InMemoryObjectStore) -> CoreResult<()> {
    store
        .register(
            "home",
            EntitySchema::new().with_field("name", FieldDef::plain(FieldType::Char)),
            records(vec![json!({"id": 1, "name": "Dashboard"})])?,
        )
        .await;
    store
        .register(
            "category",
            category_schema(),
            records(vec![
                json!({"id": 5, "name": "Office"}),
                json!({"id": 7, "name": "Lighting"}),
            ])?,
        )
        .await;
    store
        .register(
            "product",
            product_schema(),
            records(vec![
                json!({
                    "id": 1, "name": "Standing desk", "category_id": 5,
                    "list_price": 499.0, "launch_date": "2024-03-01",
                    "modified": "2024-03-01 09:00:00"
                }),
                json!({
                    "id": 2, "name": "Task chair", "category_id": 5,
                    "list_price": 189.0, "launch_date": "",
                    "modified": "2024-03-04 14:30:00"
                }),
                json!({
                    "id": 3, "name": "Desk lamp", "category_id": 7,
                    "list_price": 39.9, "launch_date": "2023-11-20",
                    "modified": "2023-11-20 08:15:00"
                }),
            ])?,
        )
        .await;
    Ok(())
}
