//! Key-value persistence seam.
//!
//! The account store only needs string get/set/remove. Production uses the
//! SQLite kv table; tests and embedders can use [`MemoryStore`].

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::DatabaseError;

/// Synchronous string key-value store. Single writer, last write wins.
pub trait KeyValueStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError>;

    fn kv_remove(&self, key: &str) -> Result<(), DatabaseError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        (**self).kv_get(key)
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        (**self).kv_set(key, value)
    }

    fn kv_remove(&self, key: &str) -> Result<(), DatabaseError> {
        (**self).kv_remove(key)
    }
}

/// In-process store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn kv_remove(&self, key: &str) -> Result<(), DatabaseError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
