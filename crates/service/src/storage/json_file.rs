use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use super::{BackendError, KeyValueBackend};

/// JSON file-backed key-value backend.
///
/// The whole key space lives in one JSON object (`{"key": "raw value"}`).
/// Every write rewrites the file through a temporary sibling and a rename, so
/// a write is on disk before `write_key` returns and a crash never leaves a
/// half-written document behind.
#[derive(Debug)]
pub struct JsonFileBackend {
    inner: RwLock<BTreeMap<String, String>>,
    file_path: PathBuf,
}

impl JsonFileBackend {
    /// Open the store at `path`. Creates the file with an empty map if missing.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, BackendError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| unavailable(parent, e))?;
        }

        let map: BTreeMap<String, String> = match fs::read(&file_path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                BackendError::Unavailable(format!("{} is not a key-value document: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let empty = BTreeMap::new();
                write_atomic(&file_path, &empty)?;
                empty
            }
            Err(e) => return Err(unavailable(&file_path, e)),
        };

        debug!(path = %file_path.display(), keys = map.len(), "json file backend opened");
        Ok(Self { inner: RwLock::new(map), file_path })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

fn unavailable(path: &Path, e: std::io::Error) -> BackendError {
    BackendError::Unavailable(format!("{}: {e}", path.display()))
}

fn poisoned<T>(_: T) -> BackendError {
    BackendError::Unavailable("json file backend lock poisoned".into())
}

fn write_atomic(path: &Path, map: &BTreeMap<String, String>) -> Result<(), BackendError> {
    let data = serde_json::to_vec_pretty(map).map_err(|e| BackendError::Unavailable(e.to_string()))?;
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let mut file = fs::File::create(&tmp).map_err(|e| unavailable(&tmp, e))?;
    file.write_all(&data).map_err(|e| unavailable(&tmp, e))?;
    file.sync_all().map_err(|e| unavailable(&tmp, e))?;
    drop(file);
    fs::rename(&tmp, path).map_err(|e| unavailable(path, e))?;
    Ok(())
}

impl KeyValueBackend for JsonFileBackend {
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
        // Held across the file write so concurrent writers cannot interleave documents.
        let mut map = self.inner.write().map_err(poisoned)?;
        let previous = map.insert(key.to_string(), value.to_string());
        if let Err(e) = write_atomic(&self.file_path, &map) {
            match previous {
                Some(old) => map.insert(key.to_string(), old),
                None => map.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}
