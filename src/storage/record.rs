//! Records: the opaque JSON objects held by every collection
//!
//! The store only understands four fields: `id`, `createdAt`, `updatedAt`
//! and `syncStatus`. Everything else belongs to whichever feature wrote it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::clock::{iso_timestamp, parse_timestamp};

pub const FIELD_ID: &str = "id";
pub const FIELD_CREATED_AT: &str = "createdAt";
pub const FIELD_UPDATED_AT: &str = "updatedAt";
pub const FIELD_SYNC_STATUS: &str = "syncStatus";

/// Whether a record has been pushed to a remote (nothing pushes yet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Pending,
    Synced,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Synced => "synced",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate a fresh record id
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// One entity in a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a record from a JSON value; `None` unless it is an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str(FIELD_ID).filter(|id| !id.is_empty())
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.get_str(FIELD_CREATED_AT).and_then(parse_timestamp)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.get_str(FIELD_UPDATED_AT).and_then(parse_timestamp)
    }

    pub fn sync_status(&self) -> Option<SyncStatus> {
        match self.get_str(FIELD_SYNC_STATUS)? {
            "pending" => Some(SyncStatus::Pending),
            "synced" => Some(SyncStatus::Synced),
            _ => None,
        }
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.set(FIELD_ID, id.into());
    }

    pub fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.set(FIELD_CREATED_AT, iso_timestamp(at));
    }

    pub fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.set(FIELD_UPDATED_AT, iso_timestamp(at));
    }

    pub fn set_sync_status(&mut self, status: SyncStatus) {
        self.set(FIELD_SYNC_STATUS, status.as_str());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Numeric field, accepting numbers stored as strings
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Overwrite the fields present in `updates`, leaving the rest alone
    pub fn merge(&mut self, updates: &Record) {
        for (key, value) in updates.0.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_merge_only_touches_listed_fields() {
        let mut record = Record::new()
            .with("name", "A")
            .with("parentPhone", "0901234567");
        let updates = Record::new().with("parentPhone", "0907654321");

        record.merge(&updates);

        assert_eq!(record.get_str("name"), Some("A"));
        assert_eq!(record.get_str("parentPhone"), Some("0907654321"));
    }

    #[test]
    fn test_metadata_accessors() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let mut record = Record::new();
        record.set_id("abc");
        record.set_created_at(at);
        record.set_updated_at(at);
        record.set_sync_status(SyncStatus::Pending);

        assert_eq!(record.id(), Some("abc"));
        assert_eq!(record.created_at(), Some(at));
        assert_eq!(record.updated_at(), Some(at));
        assert_eq!(record.sync_status(), Some(SyncStatus::Pending));
    }

    #[test]
    fn test_empty_id_is_no_id() {
        let record = Record::new().with("id", "");
        assert_eq!(record.id(), None);
    }

    #[test]
    fn test_get_f64_accepts_strings() {
        let record = Record::from_value(json!({"amount": "1500000", "fee": 2.5})).unwrap();
        assert_eq!(record.get_f64("amount"), Some(1_500_000.0));
        assert_eq!(record.get_f64("fee"), Some(2.5));
        assert_eq!(record.get_f64("missing"), None);
    }

    #[test]
    fn test_non_object_is_not_a_record() {
        assert!(Record::from_value(json!([1, 2])).is_none());
    }
}
