//! Entity persistence on top of a flat key-value medium.
//!
//! A [`KeyValueBackend`] only knows string keys and string values. The
//! [`EntityStore`] layers typed records on top of it: keys are namespaced per
//! entity type (`root/TypeName/<id>`), records are JSON objects and every type
//! keeps its own auto-increment counter at `root/TypeName/NextID`.

pub mod entity_store;
pub mod error;
pub mod json_file;
pub mod keys;
pub mod memory;

pub use entity_store::EntityStore;
pub use error::{BackendError, StoreError, StoreResult};
pub use json_file::JsonFileBackend;
pub use keys::KeyBuilder;
pub use memory::MemoryBackend;

/// Capability triple every storage medium provides.
///
/// Implementations can be file-backed, in-memory, or remote KV. Writes must be
/// durable before `write_key` returns.
pub trait KeyValueBackend: Send + Sync {
    /// Every stored key starting with `prefix`, and nothing else.
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, BackendError>;

    /// Raw value of `key`, or [`BackendError::NotFound`].
    fn read_key(&self, key: &str) -> Result<String, BackendError>;

    /// Create or overwrite `key`.
    fn write_key(&self, key: &str, value: &str) -> Result<(), BackendError>;
}
