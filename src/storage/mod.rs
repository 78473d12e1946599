use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

mod file;

pub use file::JsonFileStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read preference store: {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write preference store: {path}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to parse preference store")]
    Parse(#[from] serde_json::Error),
    #[error("preference store is not a JSON object: {path}")]
    NotAnObject { path: PathBuf },
    #[error("preference store is unavailable")]
    Unavailable,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Synchronous string key-value persistence.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Rc<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Box<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }
}

/// Process-local store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries.borrow_mut().insert(key.into(), value.into());
        store
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_returns_none_for_missing_key() {
        let store = MemoryStore::new();
        assert!(store.get("theme").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn memory_store_overwrites_existing_value() {
        let store = MemoryStore::with_entry("theme", "light");
        store.set("theme", "dark").unwrap();

        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("theme", "system").unwrap();

        assert_eq!(other.get("theme").unwrap().as_deref(), Some("system"));
    }

    #[test]
    fn boxed_store_delegates_to_inner() {
        let inner = MemoryStore::new();
        let boxed: Box<dyn PreferenceStore> = Box::new(inner.clone());
        boxed.set("theme", "dark").unwrap();

        assert_eq!(inner.get("theme").unwrap().as_deref(), Some("dark"));
    }
}
