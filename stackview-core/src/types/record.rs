//! Record snapshot and fetch envelope types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::types::Domain;

/// Record identifier as assigned by the object store
pub type RecordId = i64;

/// Field name → value mapping
pub type FieldValues = serde_json::Map<String, Value>;

/// One record snapshot. Always carries an `id` once it is held by a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(FieldValues);

impl Record {
    /// Create a record from a field mapping
    #[must_use]
    pub fn new(fields: FieldValues) -> Self {
        Self(fields)
    }

    /// Create a record carrying only an id
    #[must_use]
    pub fn with_id(id: RecordId) -> Self {
        let mut fields = FieldValues::new();
        fields.insert("id".to_string(), Value::from(id));
        Self(fields)
    }

    /// Convert an arbitrary JSON value; anything but an object is rejected
    pub fn from_value(value: Value) -> CoreResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(CoreError::InvalidRecord(format!(
                "expected an object, got {other}"
            ))),
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.0.get("id").and_then(Value::as_i64)
    }

    pub fn set_id(&mut self, id: RecordId) {
        self.0.insert("id".to_string(), Value::from(id));
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    #[must_use]
    pub fn fields(&self) -> &FieldValues {
        &self.0
    }

    #[must_use]
    pub fn into_fields(self) -> FieldValues {
        self.0
    }
}

impl From<FieldValues> for Record {
    fn from(fields: FieldValues) -> Self {
        Self(fields)
    }
}

/// Everything the object store needs to answer one collection fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub entity: String,
    /// Projection (field names to read)
    pub fields: Vec<String>,
    pub domain: Domain,
    /// View controller name, if the view declares one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    /// Extra request parameters (language, view kind, ...)
    #[serde(default)]
    pub extra: FieldValues,
}

/// One page of fetch results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchPage {
    pub records: Vec<Record>,
    /// Count of records matching the domain; may exceed `records.len()` when paginated
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(Record::from_value(json!([1, 2])).is_err());
        assert!(Record::from_value(json!("product")).is_err());

        let record = Record::from_value(json!({"id": 4, "name": "Desk"})).unwrap();
        assert_eq!(record.id(), Some(4));
        assert_eq!(record.get("name"), Some(&json!("Desk")));
    }

    #[test]
    fn non_integer_id_reads_as_missing() {
        let record = Record::from_value(json!({"id": "x"})).unwrap();
        assert_eq!(record.id(), None);
    }
}
