use serde::{Deserialize, Serialize};

use crate::entity::{impl_entity, null_as_default, EntityId};

/// Client credentials Herd obtained from one Mastodon instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AppRegistration {
    #[serde(rename = "ID")]
    pub id: EntityId,
    #[serde(deserialize_with = "null_as_default")]
    pub client_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub client_secret: String,
    #[serde(deserialize_with = "null_as_default")]
    pub instance: String,
    #[serde(rename = "MastodonAppRegistrationID", deserialize_with = "null_as_default")]
    pub mastodon_app_registration_id: String,
}

impl_entity!(AppRegistration, "AppRegistration");

impl AppRegistration {
    pub fn for_instance(instance: impl Into<String>) -> Self {
        Self { instance: instance.into(), ..Default::default() }
    }
}
