//! Entity field schema and field-type resolution

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker string sent for empty date/time values on write
pub const NULL_MARKER: &str = "null";

/// Effective type of a field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    /// Generic scalar, also the fallback for unresolvable fields
    #[default]
    Scalar,
    Char,
    Text,
    Integer,
    Float,
    Boolean,
    Selection,
    Date,
    Datetime,
    Time,
    /// Reference to a single record of `entity`
    Relation { entity: String },
    /// Reference to many records of `entity`
    RelationList { entity: String },
}

impl FieldType {
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Datetime | Self::Time)
    }

    /// Serialize a value the way the object store expects it on write.
    ///
    /// Relations collapse to their id, relation lists to a list of ids. Empty
    /// date/time values are sent as the [`NULL_MARKER`] string.
    #[must_use]
    pub fn serialize_for_write(&self, value: &Value) -> Value {
        match self {
            Self::Relation { .. } => relation_id(value),
            Self::RelationList { .. } => match value {
                Value::Array(items) => Value::Array(items.iter().map(relation_id).collect()),
                other => other.clone(),
            },
            Self::Date | Self::Datetime | Self::Time => {
                if is_empty_value(value) {
                    Value::String(NULL_MARKER.to_string())
                } else {
                    value.clone()
                }
            }
            _ => value.clone(),
        }
    }
}

fn relation_id(value: &Value) -> Value {
    match value {
        Value::Object(fields) => fields.get("id").cloned().unwrap_or(Value::Null),
        // `[id, display_name]` pairs
        Value::Array(pair) if !pair.is_empty() => pair[0].clone(),
        other => other.clone(),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// How a field is defined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Stored field of a concrete type
    Plain {
        #[serde(flatten)]
        field_type: FieldType,
    },
    /// Alias of another field of the same entity
    Alias { target: String },
    /// Computed field with a declared result type
    Computed { result: FieldType },
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldDef {
    #[must_use]
    pub fn plain(field_type: FieldType) -> Self {
        Self {
            label: None,
            kind: FieldKind::Plain { field_type },
        }
    }

    #[must_use]
    pub fn alias(target: impl Into<String>) -> Self {
        Self {
            label: None,
            kind: FieldKind::Alias {
                target: target.into(),
            },
        }
    }

    #[must_use]
    pub fn computed(result: FieldType) -> Self {
        Self {
            label: None,
            kind: FieldKind::Computed { result },
        }
    }
}

/// Field schema of one entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub fields: BTreeMap<String, FieldDef>,
    /// URL template of a single record, `{id}` is substituted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl EntitySchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    #[must_use]
    pub fn with_link(mut self, template: impl Into<String>) -> Self {
        self.link = Some(template.into());
        self
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Field names in schema order (used as the default projection)
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Effective type of `field`, following alias chains.
    ///
    /// Unknown fields, dangling aliases and alias cycles resolve to [`FieldType::Scalar`].
    #[must_use]
    pub fn resolve_type(&self, field: &str) -> FieldType {
        let mut seen = HashSet::new();
        let mut name = field;
        loop {
            if !seen.insert(name) {
                log::warn!("Alias cycle while resolving field '{field}'");
                return FieldType::Scalar;
            }
            match self.fields.get(name).map(|def| &def.kind) {
                Some(FieldKind::Plain { field_type }) => return field_type.clone(),
                Some(FieldKind::Computed { result }) => return result.clone(),
                Some(FieldKind::Alias { target }) => name = target,
                None => return FieldType::Scalar,
            }
        }
    }

    /// Link to a single record, if the entity declares a template
    #[must_use]
    pub fn record_link(&self, id: i64) -> Option<String> {
        self.link
            .as_ref()
            .map(|template| template.replace("{id}", &id.to_string()))
    }
}
