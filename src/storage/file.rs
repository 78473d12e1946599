use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::{PreferenceStore, StoreError, StoreResult};

/// Preferences kept as a flat JSON object on disk.
///
/// Every `get` re-reads the file and every `set` rewrites it, so two stores
/// pointed at the same path always agree.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StoreResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let serialized = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        if serialized.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&serialized)? {
            Value::Object(entries) => Ok(entries),
            _ => Err(StoreError::NotAnObject {
                path: self.path.clone(),
            }),
        }
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.read_entries()?;
        Ok(entries.get(key).and_then(|value| match value {
            Value::String(raw) => Some(raw.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        // Keep unrelated keys; a corrupt file is replaced rather than blocking the write.
        let mut entries = self.read_entries().unwrap_or_else(|err| {
            tracing::warn!(
                ?err,
                path = %self.path.display(),
                "discarding unreadable preference store"
            );
            Map::new()
        });
        entries.insert(key.to_string(), Value::String(value.to_string()));

        let serialized = serde_json::to_string_pretty(&Value::Object(entries))?;
        fs::write(&self.path, serialized).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(key, path = %self.path.display(), "persisted preference");
        Ok(())
    }
}
