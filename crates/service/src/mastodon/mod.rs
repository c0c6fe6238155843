//! Boundary to the Mastodon API.
//!
//! Only app registration and OAuth authorize-URL building live here; the
//! token exchange and timeline calls belong to the API wrapper, not Herd.

pub mod client;

use async_trait::async_trait;
use models::AppRegistration;

use crate::errors::ServiceError;

pub use client::MastodonClient;

/// Redirect URI Mastodon uses when the user copies the code by hand.
pub const NON_REDIRECT_URL: &str = "urn:ietf:wg:oauth:2.0:oob";

#[async_trait]
pub trait MastodonApi: Send + Sync {
    /// Register Herd as an app on `instance`. The returned registration is not
    /// stored yet and carries ID 0.
    async fn register_app(&self, instance: &str) -> Result<AppRegistration, ServiceError>;

    /// Authorize URL a user visits to grant Herd access.
    fn oauth_url(&self, registration: &AppRegistration, return_url: &str) -> Result<String, ServiceError>;
}

/// Lowercased host name without scheme, path or trailing slash.
pub fn normalize_instance(instance: &str) -> String {
    let trimmed = instance.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme
        .split('/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// `https://{instance}/oauth/authorize?...` with the query properly encoded.
pub fn build_oauth_url(
    registration: &AppRegistration,
    return_url: &str,
    scopes: &str,
) -> Result<String, ServiceError> {
    let mut url = reqwest::Url::parse(&format!("https://{}/oauth/authorize", registration.instance))
        .map_err(|e| ServiceError::Validation(format!("invalid instance {:?}: {e}", registration.instance)))?;
    url.query_pairs_mut()
        .append_pair("client_id", &registration.client_id)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", return_url)
        .append_pair("scope", scopes);
    Ok(url.to_string())
}

/// In-memory Mastodon stand-in for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    pub struct MockMastodonApi {
        registrations: AtomicUsize,
        fail: bool,
    }

    impl MockMastodonApi {
        /// A mock whose `register_app` always fails.
        pub fn failing() -> Self {
            Self { registrations: AtomicUsize::new(0), fail: true }
        }

        pub fn registrations(&self) -> usize {
            self.registrations.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MastodonApi for MockMastodonApi {
        async fn register_app(&self, instance: &str) -> Result<AppRegistration, ServiceError> {
            if self.fail {
                return Err(ServiceError::Upstream(format!("{instance} unreachable")));
            }
            let n = self.registrations.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(AppRegistration {
                id: 0,
                client_id: format!("client-id-{n}"),
                client_secret: format!("client-secret-{n}"),
                instance: instance.to_string(),
                mastodon_app_registration_id: n.to_string(),
            })
        }

        fn oauth_url(&self, registration: &AppRegistration, return_url: &str) -> Result<String, ServiceError> {
            build_oauth_url(registration, return_url, "read write follow")
        }
    }
}
