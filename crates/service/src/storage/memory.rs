use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{BackendError, KeyValueBackend};

/// Process-local backend. Keys are listed in lexicographic order.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: RwLock<BTreeMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> BackendError {
    BackendError::Unavailable("memory backend lock poisoned".into())
}

impl KeyValueBackend for MemoryBackend {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }

    fn read_key(&self, key: &str) -> Result<String, BackendError> {
        let map = self.inner.read().map_err(poisoned)?;
        map.get(key).cloned().ok_or_else(|| BackendError::NotFound(key.to_string()))
    }

    fn write_key(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
