//! Schema-flexible domain records

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One schema-flexible domain entity instance (e.g. a Patient), as
/// retrieved from the store.
///
/// Records are JSON documents; the engine itself never navigates into
/// them beyond the `resourceType`/`id` envelope fields — all field access
/// goes through the injected [`crate::PathEvaluator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Value);

impl Record {
    /// Wrap a JSON document as a record
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    /// The underlying JSON document
    pub fn document(&self) -> &Value {
        &self.0
    }

    /// The record's declared type (its table name), if present
    pub fn resource_type(&self) -> Option<&str> {
        self.0.get("resourceType").and_then(Value::as_str)
    }

    /// The record's logical id, if present
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }
}

impl From<Value> for Record {
    fn from(document: Value) -> Self {
        Self::new(document)
    }
}
