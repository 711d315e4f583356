// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Untyped records exchanged with the document store.

use serde::Serialize;
use serde_json::{Map, Value};

static NULL: Value = Value::Null;

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// A document as read back from the store.
///
/// `id` is always the store-assigned document ID; it is never part of `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    pub fields: Fields,
}

impl StoredRecord {
    pub fn new(id: impl Into<String>, mut fields: Fields) -> Self {
        fields.remove("id");
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Look up a top-level field, treating an absent key as JSON `null`.
    pub fn get(&self, key: &str) -> &Value {
        self.fields.get(key).unwrap_or(&NULL)
    }
}

/// Serialize a value into a field map suitable for a write.
///
/// The `id` key is stripped: IDs are assigned by the store and never written.
pub fn to_fields<T: Serialize>(value: &T) -> anyhow::Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        other => anyhow::bail!("expected a JSON object, got {}", other),
    }
}
