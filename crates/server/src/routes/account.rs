use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use service::app::domain::{CreateUserInput, LoginInput};
use service::errors::ServiceError;
use utoipa::ToSchema;

use super::session::SESSION_COOKIE;
use super::users::{ProfileView, UserView};
use crate::errors::ApiError;
use crate::state::ServerState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterOutput {
    pub user: UserView,
    pub profile: ProfileView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginOutput {
    pub user: UserView,
    pub token: String,
}

#[utoipa::path(post, path = "/api/account/register", tag = "account", request_body = RegisterRequest,
    responses((status = 201, body = RegisterOutput), (status = 400, body = crate::openapi::ErrorResponse), (status = 409, body = crate::openapi::ErrorResponse)))]
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterOutput>), ApiError> {
    let created = state
        .app
        .create_user(CreateUserInput {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;
    let out = RegisterOutput { user: UserView::from(&created.user), profile: created.profile.into() };
    Ok((StatusCode::CREATED, Json(out)))
}

#[utoipa::path(post, path = "/api/account/login", tag = "account", request_body = LoginRequest,
    responses((status = 200, body = LoginOutput), (status = 401, body = crate::openapi::ErrorResponse)))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginOutput>), ApiError> {
    let session = state.app.login_user(LoginInput { email: req.email, password: req.password }).await?;
    let token = session
        .token
        .ok_or_else(|| ServiceError::Token("no signing secret configured".into()))?;

    let mut cookie = Cookie::new(SESSION_COOKIE, token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    let out = LoginOutput { user: UserView::from(&session.user), token };
    Ok((jar.add(cookie), Json(out)))
}

#[utoipa::path(post, path = "/api/account/logout", tag = "account", responses((status = 204, description = "Session cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}
