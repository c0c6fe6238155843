use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use service::app::token::verify_token;
use service::errors::ServiceError;
use tracing::warn;

use crate::errors::ApiError;
use crate::state::ServerState;

/// Cookie carrying the session token set by login.
pub const SESSION_COOKIE: &str = "herd_token";

/// Token from `Authorization: Bearer`, falling back to the session cookie.
fn session_token(headers: &HeaderMap, jar: &CookieJar) -> Result<String, ServiceError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| ServiceError::Unauthorized("invalid Authorization header".into()))?;
        return value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Unauthorized("expected Authorization: Bearer <token>".into()));
    }
    jar.get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ServiceError::Unauthorized("missing session token".into()))
}

/// Reject requests without a valid session token. Verified claims are put in
/// the request extensions.
pub async fn require_session(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(req.headers(), &jar)?;
    let claims = verify_token(&state.jwt_secret, &token).map_err(|e| {
        warn!(path = %req.uri().path(), error = %e, "session token rejected");
        e
    })?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
