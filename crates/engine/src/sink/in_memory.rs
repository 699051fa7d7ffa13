use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value as JsonValue;

use smartstore_core::EntityKind;

use super::{PersistenceSink, Record, SinkError};

/// In-memory sink holding the latest JSON snapshot per entity.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySink {
    records: RwLock<HashMap<(EntityKind, String), JsonValue>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: EntityKind, key: &str) -> Option<JsonValue> {
        self.records.read().get(&(kind, key.to_string())).cloned()
    }

    /// Keys currently held for `kind`, sorted.
    pub fn keys(&self, kind: EntityKind) -> Vec<String> {
        let mut keys: Vec<String> = self
            .records
            .read()
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, key)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl PersistenceSink for InMemorySink {
    fn upsert(&self, record: &Record) -> Result<(), SinkError> {
        let value = serde_json::to_value(record)?;
        self.records.write().insert((record.kind(), record.key()), value);
        Ok(())
    }

    fn remove(&self, kind: EntityKind, key: &str) -> Result<(), SinkError> {
        self.records.write().remove(&(kind, key.to_string()));
        Ok(())
    }
}
