use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use models::UserAccount;

use super::domain::SessionClaims;
use crate::errors::ServiceError;

/// Sign an HS256 session token for `user`, valid for `ttl_hours`.
pub fn issue_token(secret: &str, user: &UserAccount, ttl_hours: i64) -> Result<String, ServiceError> {
    let exp = (chrono::Utc::now() + chrono::Duration::hours(ttl_hours)).timestamp() as usize;
    let claims = SessionClaims { sub: user.email.clone(), uid: user.id, exp };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| ServiceError::Token(e.to_string()))
}

/// Verify signature and expiry of a session token.
pub fn verify_token(secret: &str, token: &str) -> Result<SessionClaims, ServiceError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<SessionClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| ServiceError::Unauthorized(e.to_string()))
}
