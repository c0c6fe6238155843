use models::{Entity, EntityId};

use super::{StoreError, StoreResult};

const NEXT_ID_SEGMENT: &str = "NextID";

/// Builds every key the entity store reads or writes.
///
/// Layout: `root<d>Namespace<d><id>` for records and `root<d>Namespace<d>NextID`
/// for the per-type counter. All functions are pure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuilder {
    root: String,
    delimiter: String,
}

impl Default for KeyBuilder {
    fn default() -> Self {
        Self { root: "Herd".into(), delimiter: "/".into() }
    }
}

impl KeyBuilder {
    /// The delimiter may not be empty or contain digits (ID segments would stop
    /// parsing), and the root may not contain the delimiter.
    pub fn new(root: impl Into<String>, delimiter: impl Into<String>) -> StoreResult<Self> {
        let root = root.into();
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(StoreError::InvalidKeyLayout("delimiter must not be empty".into()));
        }
        if delimiter.chars().any(|c| c.is_ascii_digit()) {
            return Err(StoreError::InvalidKeyLayout(format!("delimiter {delimiter:?} contains a digit")));
        }
        if root.is_empty() || root.contains(&delimiter) {
            return Err(StoreError::InvalidKeyLayout(format!(
                "root {root:?} must be non-empty and free of the delimiter"
            )));
        }
        Ok(Self { root, delimiter })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// `root<d>Namespace`
    pub fn root_key<T: Entity>(&self) -> String {
        debug_assert!(!T::NAMESPACE.contains(&self.delimiter), "namespace contains key delimiter");
        format!("{}{}{}", self.root, self.delimiter, T::NAMESPACE)
    }

    /// Prefix handed to `list_keys` when enumerating `T`. Ends with the
    /// delimiter so `App` never matches keys of `AppRegistration`.
    pub fn list_prefix<T: Entity>(&self) -> String {
        format!("{}{}", self.root_key::<T>(), self.delimiter)
    }

    pub fn entity_key<T: Entity>(&self, id: EntityId) -> String {
        format!("{}{}", self.list_prefix::<T>(), id)
    }

    pub fn next_id_key<T: Entity>(&self) -> String {
        format!("{}{}", self.list_prefix::<T>(), NEXT_ID_SEGMENT)
    }

    /// A key names a record iff its final segment parses as an integer.
    pub fn is_instance_key(&self, key: &str) -> bool {
        key.rsplit(self.delimiter.as_str())
            .next()
            .is_some_and(|segment| segment.parse::<EntityId>().is_ok())
    }
}
