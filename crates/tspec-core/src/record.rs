//! # Frozen Record Snapshots
//!
//! `create` and `update` hand back a [`Record`]: an immutable view over the
//! constructed field map. The map lives behind an `Arc` and is never exposed
//! mutably, so a record that passed validation cannot be invalidated in
//! place by any holder. Cloning a record is a reference-count bump.

use std::ops::Deref;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// An immutable, validated record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record(Arc<Map<String, Value>>);

impl Record {
    pub(crate) fn from_map(fields: Map<String, Value>) -> Self {
        Self(Arc::new(fields))
    }

    /// Read-only access to the field map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// A fresh owned copy of the fields as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.as_ref().clone())
    }

    /// Consume the snapshot into an owned field map, copying only if the
    /// snapshot is still shared.
    pub fn into_map(self) -> Map<String, Value> {
        Arc::try_unwrap(self.0).unwrap_or_else(|shared| shared.as_ref().clone())
    }
}

/// Anything that can be viewed as a record-shaped field map.
///
/// Validation accepts plain JSON values, bare maps, and existing records
/// alike; a JSON value that is not an object has no fields.
pub trait AsFields {
    /// The field map, or `None` when the value is not record-shaped.
    fn fields(&self) -> Option<&Map<String, Value>>;
}

impl AsFields for Value {
    fn fields(&self) -> Option<&Map<String, Value>> {
        self.as_object()
    }
}

impl AsFields for Map<String, Value> {
    fn fields(&self) -> Option<&Map<String, Value>> {
        Some(self)
    }
}

impl AsFields for Record {
    fn fields(&self) -> Option<&Map<String, Value>> {
        Some(self.as_map())
    }
}

impl Deref for Record {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.into_map())
    }
}

impl PartialEq<Value> for Record {
    fn eq(&self, other: &Value) -> bool {
        other.as_object().is_some_and(|m| m == self.as_map())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}
