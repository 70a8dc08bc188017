//! Process-lifetime fallback store.
//!
//! Used when the hosted record store is unconfigured. Contents are lost on
//! restart; that is the accepted contract of the fallback path, not a bug.
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::demo::demo_events;
use crate::query::ListQuery;
use crate::{ANALYTICS, ListResult, RecordStore, StoreError, UpdateOutcome};

pub struct MemoryStore {
    visitors: Mutex<Vec<Value>>,
    analytics: Mutex<Vec<Value>>,
    demo: Vec<Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            visitors: Mutex::new(Vec::new()),
            analytics: Mutex::new(Vec::new()),
            demo: demo_events(),
        }
    }

    fn rows_of(&self, collection: &str) -> &Mutex<Vec<Value>> {
        if collection == ANALYTICS {
            &self.analytics
        } else {
            &self.visitors
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn source(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, collection: &str, query: ListQuery) -> Result<ListResult, StoreError> {
        let real = self.rows_of(collection).lock().unwrap().clone();
        let real_count = real.len();

        // Demo records only exist for the analytics collection.
        let mut rows: Vec<Value> = if collection == ANALYTICS {
            self.demo.iter().cloned().chain(real).collect()
        } else {
            real
        };
        let demo_count = if collection == ANALYTICS {
            self.demo.len()
        } else {
            0
        };

        rows.retain(|row| query.matches(row));

        if let Some(field) = &query.order_desc {
            rows.sort_by(|a, b| {
                let a = a.get(field).and_then(Value::as_str).unwrap_or("");
                let b = b.get(field).and_then(Value::as_str).unwrap_or("");
                b.cmp(a)
            });
        }

        let total = rows.len();
        let offset = query.offset.unwrap_or(0).min(total);
        let end = match query.limit {
            Some(limit) => (offset + limit).min(total),
            None => total,
        };

        Ok(ListResult {
            rows: rows[offset..end].to_vec(),
            total,
            real_count: Some(real_count),
            demo_count: Some(demo_count),
        })
    }

    async fn insert(&self, collection: &str, record: Value) -> Result<Value, StoreError> {
        self.rows_of(collection).lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        collection: &str,
        filter: (&str, &str),
        patch: Value,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut rows = self.rows_of(collection).lock().unwrap();
        let mut patched = Vec::new();

        for row in rows.iter_mut() {
            if row.get(filter.0).and_then(Value::as_str) != Some(filter.1) {
                continue;
            }
            if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
            }
            patched.push(row.clone());
        }

        if patched.is_empty() {
            Ok(UpdateOutcome::NoContent)
        } else {
            Ok(UpdateOutcome::Rows(patched))
        }
    }
}
