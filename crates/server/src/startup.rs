use std::sync::Arc;

use configs::{AppConfig, ServerConfig};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes;
use crate::state::{AppHandle, ServerState};
use service::app::{HerdApp, HerdAppConfig};
use service::mastodon::{MastodonApi, MastodonClient};
use service::runtime;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Configured secret, or a random per-process one. Tokens signed with the
/// random secret stop verifying after a restart.
fn resolve_jwt_secret(cfg: &AppConfig) -> String {
    match cfg.auth.secret() {
        Some(secret) => secret.to_string(),
        None => {
            warn!("no auth.jwt_secret or HERD_JWT_SECRET set; using an ephemeral secret");
            uuid::Uuid::new_v4().simple().to_string()
        }
    }
}

/// Wire config into a ready [`ServerState`]: storage, Mastodon client, business layer.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    runtime::ensure_env(&cfg.storage).await?;
    let store = runtime::open_entity_store(&cfg.storage)?;
    let api: Arc<dyn MastodonApi> = Arc::new(MastodonClient::new(&cfg.mastodon)?);

    let jwt_secret = resolve_jwt_secret(cfg);
    let app: AppHandle = HerdApp::new(
        Arc::new(store),
        api,
        HerdAppConfig { jwt_secret: Some(jwt_secret.clone()), token_ttl_hours: cfg.auth.token_ttl_hours },
    );
    Ok(ServerState::new(app, jwt_secret))
}

async fn bind(server: &ServerConfig) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind((server.host.as_str(), server.port)).await?;
    Ok(listener)
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::load_and_validate()?;
    let state = build_state(&cfg).await?;
    let app = routes::build_router(state, build_cors());

    let listener = bind(&cfg.server).await?;
    info!(addr = %listener.local_addr()?, storage = ?cfg.storage.backend, "herd server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
