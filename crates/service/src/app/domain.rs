use models::{EntityId, UserAccount, UserProfile};
use serde::{Deserialize, Serialize};

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Newly created account together with its profile
#[derive(Debug, Clone)]
pub struct CreatedUser {
    pub user: UserAccount,
    pub profile: UserProfile,
}

/// Login result (session)
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user: UserAccount,
    pub token: Option<String>,
}

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub sub: String,
    pub uid: EntityId,
    pub exp: usize,
}
