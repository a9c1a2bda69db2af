//! Opaque-key tracking path.
//!
//! A second event-sourcing surface for interception layers that identify
//! resources by an opaque string key instead of a raw fd. No kind
//! classification happens here; records live in a single registry. The
//! fd-typed path in [`crate::collector`] is the primary path, and the two
//! share no storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// One currently-open resource tracked by opaque key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedRecord {
    /// Call stack captured at open time.
    pub stack: String,
    /// When the open event was observed.
    pub opened_at: DateTime<Utc>,
}

/// Registry of key → record, insert-overwrite / remove / snapshot.
#[derive(Debug, Default)]
pub struct KeyedRegistry {
    entries: Mutex<HashMap<String, KeyedRecord>>,
}

impl KeyedRegistry {
    /// Create an empty keyed registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or overwrite) the record for `key`. Returns true if an
    /// existing record was overwritten.
    pub fn insert(&self, key: &str, stack: String) -> bool {
        let record = KeyedRecord {
            stack,
            opened_at: Utc::now(),
        };
        self.lock().insert(key.to_string(), record).is_some()
    }

    /// Remove the record for `key`. A miss returns `None`.
    pub fn remove(&self, key: &str) -> Option<KeyedRecord> {
        self.lock().remove(key)
    }

    /// Copy of the current entries, sorted by key.
    pub fn snapshot(&self) -> Vec<(String, KeyedRecord)> {
        let mut entries: Vec<(String, KeyedRecord)> = self
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, KeyedRecord>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
