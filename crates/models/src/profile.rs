use serde::{Deserialize, Serialize};

use crate::entity::{impl_entity, null_as_default, EntityId};
use crate::errors::ModelError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserProfile {
    #[serde(rename = "ID")]
    pub id: EntityId,
    #[serde(rename = "UserID")]
    pub user_id: EntityId,
    #[serde(deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_name: String,
}

impl_entity!(UserProfile, "UserProfile");

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    Ok(())
}
