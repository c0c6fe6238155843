use axum::{
    extract::{Path, State},
    Json,
};
use models::{EntityId, MastodonConnection, UserAccount, UserProfile};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::state::ServerState;

/// Account as exposed over HTTP. Password material and the Mastodon access
/// token stay on the server.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserView {
    #[schema(value_type = i64)]
    pub id: EntityId,
    pub email: String,
    #[schema(value_type = i64)]
    pub profile_id: EntityId,
    pub mastodon: Option<MastodonLinkView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MastodonLinkView {
    #[schema(value_type = i64)]
    pub app_registration_id: EntityId,
    pub mastodon_user_id: String,
    pub scope: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileView {
    #[schema(value_type = i64)]
    pub id: EntityId,
    #[schema(value_type = i64)]
    pub user_id: EntityId,
    pub first_name: String,
    pub last_name: String,
}

impl From<&MastodonConnection> for MastodonLinkView {
    fn from(c: &MastodonConnection) -> Self {
        Self {
            app_registration_id: c.app_registration_id,
            mastodon_user_id: c.mastodon_user_id.clone(),
            scope: c.scope.clone(),
            created_at: c.created_at.clone(),
        }
    }
}

impl From<&UserAccount> for UserView {
    fn from(u: &UserAccount) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            profile_id: u.profile_id,
            mastodon: u.mastodon_connection.as_ref().map(MastodonLinkView::from),
        }
    }
}

impl From<UserProfile> for ProfileView {
    fn from(p: UserProfile) -> Self {
        Self { id: p.id, user_id: p.user_id, first_name: p.first_name, last_name: p.last_name }
    }
}

#[utoipa::path(get, path = "/api/users/{id}", tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses((status = 200, body = UserView), (status = 401, body = crate::openapi::ErrorResponse), (status = 404, body = crate::openapi::ErrorResponse)),
    security(("bearer" = [])))]
pub async fn get_user(
    State(state): State<ServerState>,
    Path(id): Path<EntityId>,
) -> Result<Json<UserView>, ApiError> {
    let user = state.app.get_user(id).await?;
    Ok(Json(UserView::from(&user)))
}

#[utoipa::path(get, path = "/api/users/{id}/profile", tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses((status = 200, body = ProfileView), (status = 404, body = crate::openapi::ErrorResponse)),
    security(("bearer" = [])))]
pub async fn get_user_profile(
    State(state): State<ServerState>,
    Path(id): Path<EntityId>,
) -> Result<Json<ProfileView>, ApiError> {
    let user = state.app.get_user(id).await?;
    let profile = state.app.get_profile(user.profile_id).await?;
    Ok(Json(profile.into()))
}
