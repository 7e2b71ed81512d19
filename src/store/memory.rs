//! In-memory entity store for tests and embedders.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use propcal_core::{CalendarError, CalendarResult};

use super::{Collection, EntityStore, SortSpec};

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with records, assigning ids where missing.
    pub fn seed(&self, collection: Collection, records: Vec<Value>) {
        let mut guard = self.lock_collections();
        let entry = guard.entry(collection).or_default();
        for mut record in records {
            ensure_id(&mut record);
            entry.push(record);
        }
    }

    fn lock_collections(&self) -> std::sync::MutexGuard<'_, HashMap<Collection, Vec<Value>>> {
        // A poisoned lock only means a test panicked mid-write
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn ensure_id(record: &mut Value) {
    if let Value::Object(fields) = record {
        if !fields.contains_key("id") {
            fields.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

fn matches_filter(record: &Value, filter: &Map<String, Value>) -> bool {
    filter
        .iter()
        .all(|(field, expected)| record.get(field) == Some(expected))
}

/// Field ordering for sort specs: strings lexically, numbers numerically,
/// everything else by JSON text.
fn compare_field(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list(
        &self,
        collection: Collection,
        filter: &Map<String, Value>,
        sort: Option<&SortSpec>,
        limit: Option<usize>,
    ) -> CalendarResult<Vec<Value>> {
        let guard = self.lock_collections();
        let mut records: Vec<Value> = guard
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| matches_filter(record, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(guard);

        if let Some(spec) = sort {
            records.sort_by(|a, b| {
                let ordering = compare_field(
                    a.get(&spec.field).unwrap_or(&Value::Null),
                    b.get(&spec.field).unwrap_or(&Value::Null),
                );
                if spec.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if let Some(limit) = limit {
            records.truncate(limit);
        }

        Ok(records)
    }

    async fn create(&self, collection: Collection, mut record: Value) -> CalendarResult<Value> {
        if !record.is_object() {
            return Err(CalendarError::Store("Record must be a JSON object".into()));
        }
        ensure_id(&mut record);

        let mut guard = self.lock_collections();
        guard.entry(collection).or_default().push(record.clone());
        Ok(record)
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> CalendarResult<Value> {
        let Value::Object(patch_fields) = patch else {
            return Err(CalendarError::Store("Patch must be a JSON object".into()));
        };

        let mut guard = self.lock_collections();
        let records = guard
            .get_mut(&collection)
            .ok_or_else(|| CalendarError::EventNotFound(id.to_string()))?;
        let record = records
            .iter_mut()
            .find(|record| record_id(record) == Some(id))
            .ok_or_else(|| CalendarError::EventNotFound(id.to_string()))?;

        if let Value::Object(fields) = record {
            for (field, value) in patch_fields {
                fields.insert(field, value);
            }
        }
        Ok(record.clone())
    }

    async fn delete(&self, collection: Collection, id: &str) -> CalendarResult<()> {
        let mut guard = self.lock_collections();
        if let Some(records) = guard.get_mut(&collection) {
            records.retain(|record| record_id(record) != Some(id));
        }
        Ok(())
    }
}
