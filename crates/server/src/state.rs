use std::sync::Arc;

use service::app::HerdApp;
use service::mastodon::MastodonApi;
use service::storage::EntityStore;

/// Herd commands as wired for the server: entity store plus any Mastodon API.
pub type AppHandle = HerdApp<EntityStore, dyn MastodonApi>;

#[derive(Clone)]
pub struct ServerState {
    pub app: Arc<AppHandle>,
    /// Secret used to verify session tokens on protected routes.
    pub jwt_secret: Arc<str>,
}

impl ServerState {
    pub fn new(app: AppHandle, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self { app: Arc::new(app), jwt_secret: jwt_secret.into() }
    }
}
