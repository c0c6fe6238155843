use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

/// Numeric primary key. Issued IDs start at 1; 0 means "not stored yet".
pub type EntityId = i64;

/// A record the entity store can persist.
///
/// `NAMESPACE` becomes the type segment of every key written for the record,
/// so it must be stable across releases and must not contain the store's key
/// delimiter.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const NAMESPACE: &'static str;

    fn id(&self) -> EntityId;
    fn set_id(&mut self, id: EntityId);
}

/// Implements [`Entity`] for a struct with an `id: EntityId` field.
macro_rules! impl_entity {
    ($ty:ty, $namespace:literal) => {
        impl $crate::entity::Entity for $ty {
            const NAMESPACE: &'static str = $namespace;

            fn id(&self) -> $crate::entity::EntityId {
                self.id
            }

            fn set_id(&mut self, id: $crate::entity::EntityId) {
                self.id = id;
            }
        }
    };
}

pub(crate) use impl_entity;

/// Reads `null` as the type's default. Records written by other
/// implementations serialize unset strings as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
