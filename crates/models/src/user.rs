use serde::{Deserialize, Serialize};

use crate::entity::{impl_entity, null_as_default, EntityId};
use crate::errors::ModelError;

/// Password material. `SaltedPassword` holds a PHC-format hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserAccountSecurity {
    /// Integer salt of legacy records. Zero for argon2 hashes, whose PHC
    /// string carries its own salt.
    #[serde(deserialize_with = "null_as_default")]
    pub salt_key: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub salted_password: String,
}

/// Link between a Herd account and a Mastodon account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MastodonConnection {
    #[serde(rename = "AppRegistrationID")]
    pub app_registration_id: EntityId,
    #[serde(deserialize_with = "null_as_default")]
    pub api_access_token: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub scope: String,
    #[serde(deserialize_with = "null_as_default")]
    pub token_type: String,
    #[serde(rename = "MastodonUserID", deserialize_with = "null_as_default")]
    pub mastodon_user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserAccount {
    #[serde(rename = "ID")]
    pub id: EntityId,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(rename = "ProfileID")]
    pub profile_id: EntityId,
    #[serde(deserialize_with = "null_as_default")]
    pub security: UserAccountSecurity,
    pub mastodon_connection: Option<MastodonConnection>,
}

impl_entity!(UserAccount, "UserAccount");

impl UserAccount {
    /// Case-insensitive comparison against a trimmed email.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ModelError::Validation("invalid email".into()));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ModelError> {
    if password.len() < 8 {
        return Err(ModelError::Validation("password too short (>=8)".into()));
    }
    Ok(())
}
