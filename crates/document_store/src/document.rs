//! Documents, collections and filters.

use std::{cmp::Ordering, fmt};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{DocumentStoreError, StoreResult};

/// Top-level fields of a document.
pub type Fields = serde_json::Map<String, Value>;

/// Named collections of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Students,
    Courses,
    Attendance,
}

impl Collection {
    /// All collections.
    pub const ALL: [Collection; 3] = [Self::Students, Self::Courses, Self::Attendance];

    /// Converts the collection to a string for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Courses => "courses",
            Self::Attendance => "attendance",
        }
    }

    /// Parses a collection from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "students" => Some(Self::Students),
            "courses" => Some(Self::Courses),
            "attendance" => Some(Self::Attendance),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document: an ID plus a JSON object of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document ID, unique within its collection.
    pub id: String,
    /// Top-level fields (never contains `id`).
    pub fields: Fields,
}

impl Document {
    /// Creates a document from its ID and fields.
    pub fn new(id: impl Into<String>, mut fields: Fields) -> Self {
        fields.remove("id");
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Serializes an entity into document fields, dropping its `id`.
    pub fn encode<T: Serialize>(entity: &T) -> StoreResult<Fields> {
        match serde_json::to_value(entity)? {
            Value::Object(mut fields) => {
                fields.remove("id");
                Ok(fields)
            }
            other => Err(DocumentStoreError::InvalidDocument(format!(
                "expected an object, got {}",
                other
            ))),
        }
    }

    /// Deserializes the document into an entity, restoring its `id`.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    /// Returns a field value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    /// Returns a string field value.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }
}

/// A single condition on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value.
    Eq(String, Value),
    /// Field is greater than or equal to the value.
    Gte(String, Value),
    /// Field is less than the value.
    Lt(String, Value),
    /// Field is less than or equal to the value.
    Lte(String, Value),
    /// Field is absent or null.
    Missing(String),
}

impl Condition {
    fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::Eq(field, value) => doc.field(field) == Some(value),
            Self::Gte(field, value) => {
                matches!(compare(doc.field(field), value), Some(Ordering::Greater | Ordering::Equal))
            }
            Self::Lt(field, value) => {
                matches!(compare(doc.field(field), value), Some(Ordering::Less))
            }
            Self::Lte(field, value) => {
                matches!(compare(doc.field(field), value), Some(Ordering::Less | Ordering::Equal))
            }
            Self::Missing(field) => doc.field(field).is_none(),
        }
    }
}

/// Orders strings lexicographically and numbers numerically; other pairs are
/// incomparable and never satisfy a range condition.
fn compare(actual: Option<&Value>, expected: &Value) -> Option<Ordering> {
    match (actual?, expected) {
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        _ => None,
    }
}

/// Conjunction of field conditions. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Creates a new empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `field == value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field.into(), value.into()));
        self
    }

    /// Requires `field >= value`.
    pub fn gte(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Gte(field.into(), value.into()));
        self
    }

    /// Requires `field < value`.
    pub fn lt(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Lt(field.into(), value.into()));
        self
    }

    /// Requires `field <= value`.
    pub fn lte(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Lte(field.into(), value.into()));
        self
    }

    /// Requires the field to be absent or null.
    pub fn missing(mut self, field: impl Into<String>) -> Self {
        self.conditions.push(Condition::Missing(field.into()));
        self
    }

    /// Returns the conditions of this filter.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns true if the document satisfies every condition.
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}
