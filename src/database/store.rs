//! Key-value persistence contract used by the session.
use crate::error::StoreError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Keys the engine reads and writes. Nothing else is persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKey {
    UserData,
    Settings,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::UserData => "tutor.userData",
            StoreKey::Settings => "tutor.settings",
        }
    }
}

pub trait PersistenceStore {
    /// `Ok(None)` when nothing was stored under `key`.
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError>;
}

/// Store that lives only as long as the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PersistenceStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }
}
