use std::sync::{Arc, Mutex};

use models::{Entity, EntityId};
use tracing::{debug, warn};

use super::{BackendError, KeyBuilder, KeyValueBackend, MemoryBackend, StoreError, StoreResult};

/// Typed document store over any [`KeyValueBackend`].
///
/// Reads take no lock and get no snapshot isolation beyond what a single
/// backend call provides. Only ID allocation is serialized: one mutex per
/// store, shared by its clones and covering every entity type. Open one store
/// per backend; two stores over the same medium do not share the allocator.
#[derive(Clone)]
pub struct EntityStore {
    backend: Arc<dyn KeyValueBackend>,
    keys: KeyBuilder,
    id_lock: Arc<Mutex<()>>,
}

impl EntityStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>, keys: KeyBuilder) -> Self {
        Self { backend, keys, id_lock: Arc::new(Mutex::new(())) }
    }

    /// Store over a fresh [`MemoryBackend`] with the default key layout.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()), KeyBuilder::default())
    }

    pub fn keys(&self) -> &KeyBuilder {
        &self.keys
    }

    /// Record stored under `id`. Missing or undecodable records are `None`;
    /// only a failing medium is an error.
    pub fn get_by_id<T: Entity>(&self, id: EntityId) -> StoreResult<Option<T>> {
        let key = self.keys.entity_key::<T>(id);
        self.read_entity(&key)
    }

    /// First record of `T` matching `predicate`, in backend key order.
    ///
    /// Linear scan with no index. Corrupt records are skipped.
    pub fn find<T, P>(&self, predicate: P) -> StoreResult<Option<T>>
    where
        T: Entity,
        P: Fn(&T) -> bool,
    {
        for key in self.instance_keys::<T>()? {
            if let Some(entity) = self.read_entity::<T>(&key)? {
                if predicate(&entity) {
                    return Ok(Some(entity));
                }
            }
        }
        Ok(None)
    }

    /// Every decodable record of `T`, in backend key order.
    pub fn list_all<T: Entity>(&self) -> StoreResult<Vec<T>> {
        let mut out = Vec::new();
        for key in self.instance_keys::<T>()? {
            if let Some(entity) = self.read_entity::<T>(&key)? {
                out.push(entity);
            }
        }
        Ok(out)
    }

    /// Assign the next ID of `T` to `entity` and persist it.
    ///
    /// Any ID already on `entity` is overwritten.
    pub fn create<T: Entity>(&self, mut entity: T) -> StoreResult<T> {
        let id = self.allocate_id::<T>()?;
        entity.set_id(id);
        self.write_entity(&entity)?;
        debug!(namespace = T::NAMESPACE, id, "entity created");
        Ok(entity)
    }

    /// Overwrite the stored record. No existence check: only pass entities
    /// obtained from [`create`](Self::create) or a read.
    pub fn update<T: Entity>(&self, entity: &T) -> StoreResult<()> {
        if entity.id() <= 0 {
            return Err(StoreError::MissingId { namespace: T::NAMESPACE });
        }
        self.write_entity(entity)?;
        debug!(namespace = T::NAMESPACE, id = entity.id(), "entity updated");
        Ok(())
    }

    fn instance_keys<T: Entity>(&self) -> StoreResult<Vec<String>> {
        let prefix = self.keys.list_prefix::<T>();
        let keys = self.backend.list_keys(&prefix)?;
        Ok(keys.into_iter().filter(|k| self.keys.is_instance_key(k)).collect())
    }

    fn read_entity<T: Entity>(&self, key: &str) -> StoreResult<Option<T>> {
        let raw = match self.backend.read_key(key) {
            Ok(raw) => raw,
            Err(BackendError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<T>(&raw) {
            Ok(entity) => Ok(Some(entity)),
            Err(e) => {
                warn!(%key, error = %e, "skipping undecodable record");
                Ok(None)
            }
        }
    }

    fn write_entity<T: Entity>(&self, entity: &T) -> StoreResult<()> {
        let key = self.keys.entity_key::<T>(entity.id());
        let value = serde_json::to_string(entity).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.backend.write_key(&key, &value)?;
        Ok(())
    }

    /// Read counter, hand out its value, write back value + 1. The counter is a
    /// bare JSON integer; absent or blank means 1.
    fn allocate_id<T: Entity>(&self) -> StoreResult<EntityId> {
        let _guard = self.id_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let key = self.keys.next_id_key::<T>();

        let id = match self.backend.read_key(&key) {
            Ok(raw) if !raw.trim().is_empty() => serde_json::from_str::<EntityId>(raw.trim())
                .map_err(|e| StoreError::CorruptCounter { key: key.clone(), reason: e.to_string() })?,
            Ok(_) | Err(BackendError::NotFound(_)) => 1,
            Err(e) => return Err(e.into()),
        };
        if id < 1 {
            return Err(StoreError::CorruptCounter { key, reason: format!("counter {id} is not positive") });
        }

        let next = id.checked_add(1).ok_or_else(|| StoreError::CorruptCounter {
            key: key.clone(),
            reason: format!("counter {id} cannot be incremented"),
        })?;
        let next = serde_json::to_string(&next).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.backend.write_key(&key, &next)?;
        debug!(namespace = T::NAMESPACE, id, "id allocated");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{AppRegistration, UserAccount};

    /// Backend whose medium is gone.
    struct DownBackend;

    impl KeyValueBackend for DownBackend {
        fn list_keys(&self, _prefix: &str) -> Result<Vec<String>, BackendError> {
            Err(BackendError::Unavailable("disk detached".into()))
        }
        fn read_key(&self, _key: &str) -> Result<String, BackendError> {
            Err(BackendError::Unavailable("disk detached".into()))
        }
        fn write_key(&self, _key: &str, _value: &str) -> Result<(), BackendError> {
            Err(BackendError::Unavailable("disk detached".into()))
        }
    }

    fn store_with_backend() -> (EntityStore, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let store = EntityStore::new(backend.clone(), KeyBuilder::default());
        (store, backend)
    }

    #[test]
    fn counter_is_bare_json_integer() -> Result<(), anyhow::Error> {
        let (store, backend) = store_with_backend();
        store.create(AppRegistration::for_instance("a"))?;
        store.create(AppRegistration::for_instance("b"))?;
        assert_eq!(backend.read_key("Herd/AppRegistration/NextID")?, "3");
        Ok(())
    }

    #[test]
    fn record_is_json_object() -> Result<(), anyhow::Error> {
        let (store, backend) = store_with_backend();
        store.create(AppRegistration::for_instance("mastodon.social"))?;
        let raw = backend.read_key("Herd/AppRegistration/1")?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        assert_eq!(value["ID"], 1);
        assert_eq!(value["Instance"], "mastodon.social");
        Ok(())
    }

    #[test]
    fn existing_counter_is_continued() -> Result<(), anyhow::Error> {
        let (store, backend) = store_with_backend();
        backend.write_key("Herd/UserAccount/NextID", "41")?;
        let user = store.create(UserAccount::default())?;
        assert_eq!(user.id, 41);
        assert_eq!(backend.read_key("Herd/UserAccount/NextID")?, "42");
        Ok(())
    }

    #[test]
    fn blank_counter_starts_at_one() -> Result<(), anyhow::Error> {
        let (store, backend) = store_with_backend();
        backend.write_key("Herd/UserAccount/NextID", "  ")?;
        assert_eq!(store.create(UserAccount::default())?.id, 1);
        Ok(())
    }

    #[test]
    fn corrupt_counter_fails_create() -> Result<(), anyhow::Error> {
        let (store, backend) = store_with_backend();
        backend.write_key("Herd/UserAccount/NextID", "\"seven\"")?;
        let err = store.create(UserAccount::default()).unwrap_err();
        assert!(matches!(err, StoreError::CorruptCounter { .. }));
        // nothing was written under an ID
        assert!(store.list_all::<UserAccount>()?.is_empty());
        Ok(())
    }

    #[test]
    fn exhausted_counter_fails_create() -> Result<(), anyhow::Error> {
        let (store, backend) = store_with_backend();
        let key = "Herd/UserAccount/NextID";
        backend.write_key(key, &i64::MAX.to_string())?;
        let err = store.create(UserAccount::default()).unwrap_err();
        assert!(matches!(err, StoreError::CorruptCounter { .. }));
        assert_eq!(backend.read_key(key)?, i64::MAX.to_string());
        assert!(store.get_by_id::<UserAccount>(i64::MAX)?.is_none());
        Ok(())
    }

    #[test]
    fn corrupt_record_reads_as_absent_and_is_skipped() -> Result<(), anyhow::Error> {
        let (store, backend) = store_with_backend();
        store.create(AppRegistration::for_instance("one"))?;
        backend.write_key("Herd/AppRegistration/2", "{ broken")?;
        store.create(AppRegistration::for_instance("three"))?;

        assert!(store.get_by_id::<AppRegistration>(2)?.is_none());
        let all = store.list_all::<AppRegistration>()?;
        assert_eq!(all.iter().map(|r| r.instance.as_str()).collect::<Vec<_>>(), vec!["one", "three"]);
        let found = store.find::<AppRegistration, _>(|r| r.instance == "three")?;
        assert_eq!(found.map(|r| r.id), Some(3));
        Ok(())
    }

    #[test]
    fn non_numeric_keys_are_not_enumerated() -> Result<(), anyhow::Error> {
        let (store, backend) = store_with_backend();
        store.create(AppRegistration::for_instance("one"))?;
        backend.write_key("Herd/AppRegistration/Meta", r#"{"ID": 99, "Instance": "meta"}"#)?;
        let all = store.list_all::<AppRegistration>()?;
        assert_eq!(all.len(), 1);
        Ok(())
    }

    #[test]
    fn update_requires_id() {
        let store = EntityStore::in_memory();
        let err = store.update(&AppRegistration::for_instance("x")).unwrap_err();
        assert!(matches!(err, StoreError::MissingId { namespace: "AppRegistration" }));
    }

    #[test]
    fn unavailable_backend_is_reported_not_absent() {
        let store = EntityStore::new(Arc::new(DownBackend), KeyBuilder::default());
        assert!(matches!(
            store.get_by_id::<AppRegistration>(1),
            Err(StoreError::Backend(BackendError::Unavailable(_)))
        ));
        assert!(store.find::<AppRegistration, _>(|_| true).is_err());
        assert!(store.list_all::<AppRegistration>().is_err());
        assert!(store.create(AppRegistration::default()).is_err());
    }

    #[test]
    fn custom_layout_is_used() -> Result<(), anyhow::Error> {
        let backend = Arc::new(MemoryBackend::new());
        let store = EntityStore::new(backend.clone(), KeyBuilder::new("Test", "::")?);
        store.create(UserAccount::default())?;
        assert!(backend.read_key("Test::UserAccount::1").is_ok());
        assert_eq!(backend.read_key("Test::UserAccount::NextID")?, "2");
        Ok(())
    }
}
