use axum::{
    extract::{Path, Query, State},
    Json,
};
use models::{AppRegistration, EntityId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::errors::ApiError;
use crate::state::ServerState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegistrationRequest {
    /// Host name of the Mastodon instance, e.g. `mastodon.social`.
    pub instance: String,
}

/// Registration without its client secret.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationView {
    #[schema(value_type = i64)]
    pub id: EntityId,
    pub instance: String,
    pub client_id: String,
    pub mastodon_app_registration_id: String,
}

impl From<AppRegistration> for RegistrationView {
    fn from(r: AppRegistration) -> Self {
        Self {
            id: r.id,
            instance: r.instance,
            client_id: r.client_id,
            mastodon_app_registration_id: r.mastodon_app_registration_id,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OAuthUrlQuery {
    /// Where the instance redirects after authorization. Out-of-band when absent.
    pub return_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OAuthUrlView {
    pub url: String,
}

#[utoipa::path(post, path = "/api/registrations", tag = "registrations", request_body = RegistrationRequest,
    responses((status = 200, body = RegistrationView), (status = 400, body = crate::openapi::ErrorResponse), (status = 502, body = crate::openapi::ErrorResponse)),
    security(("bearer" = [])))]
pub async fn get_or_create(
    State(state): State<ServerState>,
    Json(req): Json<RegistrationRequest>,
) -> Result<Json<RegistrationView>, ApiError> {
    let registration = state.app.get_or_create_registration(&req.instance).await?;
    Ok(Json(registration.into()))
}

#[utoipa::path(get, path = "/api/registrations/{id}", tag = "registrations",
    params(("id" = i64, Path, description = "Registration ID")),
    responses((status = 200, body = RegistrationView), (status = 404, body = crate::openapi::ErrorResponse)),
    security(("bearer" = [])))]
pub async fn get_registration(
    State(state): State<ServerState>,
    Path(id): Path<EntityId>,
) -> Result<Json<RegistrationView>, ApiError> {
    let registration = state.app.get_registration(id).await?;
    Ok(Json(registration.into()))
}

#[utoipa::path(get, path = "/api/registrations/{id}/oauth-url", tag = "registrations",
    params(("id" = i64, Path, description = "Registration ID"), OAuthUrlQuery),
    responses((status = 200, body = OAuthUrlView), (status = 400, body = crate::openapi::ErrorResponse)),
    security(("bearer" = [])))]
pub async fn oauth_url(
    State(state): State<ServerState>,
    Path(id): Path<EntityId>,
    Query(query): Query<OAuthUrlQuery>,
) -> Result<Json<OAuthUrlView>, ApiError> {
    let url = state.app.get_oauth_url(id, query.return_url.as_deref()).await?;
    Ok(Json(OAuthUrlView { url }))
}
