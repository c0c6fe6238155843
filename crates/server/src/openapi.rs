use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::routes::account::{LoginOutput, LoginRequest, RegisterOutput, RegisterRequest};
use crate::routes::registrations::{OAuthUrlView, RegistrationRequest, RegistrationView};
use crate::routes::users::{MastodonLinkView, ProfileView, UserView};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorResponse { pub error: String, pub code: u16 }

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::account::register,
        crate::routes::account::login,
        crate::routes::account::logout,
        crate::routes::users::get_user,
        crate::routes::users::get_user_profile,
        crate::routes::registrations::get_or_create,
        crate::routes::registrations::get_registration,
        crate::routes::registrations::oauth_url,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            RegisterRequest,
            RegisterOutput,
            LoginRequest,
            LoginOutput,
            UserView,
            MastodonLinkView,
            ProfileView,
            RegistrationRequest,
            RegistrationView,
            OAuthUrlView,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "account"),
        (name = "users"),
        (name = "registrations")
    )
)]
pub struct ApiDoc;
