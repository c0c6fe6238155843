use std::time::Duration;

use async_trait::async_trait;
use configs::MastodonConfig;
use models::AppRegistration;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{build_oauth_url, MastodonApi, NON_REDIRECT_URL};
use crate::errors::ServiceError;

#[derive(Debug, Serialize)]
struct RegisterAppRequest<'a> {
    client_name: &'a str,
    redirect_uris: &'a str,
    scopes: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    website: &'a str,
}

fn is_blank(s: &&str) -> bool {
    s.trim().is_empty()
}

#[derive(Debug, Deserialize)]
struct RegisterAppResponse {
    #[serde(default)]
    id: serde_json::Value,
    client_id: String,
    client_secret: String,
}

impl RegisterAppResponse {
    fn into_registration(self, instance: &str) -> AppRegistration {
        let remote_id = match self.id {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        AppRegistration {
            id: 0,
            client_id: self.client_id,
            client_secret: self.client_secret,
            instance: instance.to_string(),
            mastodon_app_registration_id: remote_id,
        }
    }
}

/// `reqwest`-backed [`MastodonApi`]. No retries.
#[derive(Clone)]
pub struct MastodonClient {
    http: reqwest::Client,
    client_name: String,
    scopes: String,
    website: String,
}

impl MastodonClient {
    pub fn new(cfg: &MastodonConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(Self {
            http,
            client_name: cfg.client_name.clone(),
            scopes: cfg.scopes.clone(),
            website: cfg.website.clone(),
        })
    }
}

#[async_trait]
impl MastodonApi for MastodonClient {
    #[instrument(skip(self))]
    async fn register_app(&self, instance: &str) -> Result<AppRegistration, ServiceError> {
        let url = format!("https://{instance}/api/v1/apps");
        let body = RegisterAppRequest {
            client_name: &self.client_name,
            redirect_uris: NON_REDIRECT_URL,
            scopes: &self.scopes,
            website: &self.website,
        };
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Upstream(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Upstream(format!("{url} returned {status}")));
        }
        let parsed = resp
            .json::<RegisterAppResponse>()
            .await
            .map_err(|e| ServiceError::Upstream(e.to_string()))?;
        let registration = parsed.into_registration(instance);
        info!(%instance, remote_id = %registration.mastodon_app_registration_id, "app registered with instance");
        Ok(registration)
    }

    fn oauth_url(&self, registration: &AppRegistration, return_url: &str) -> Result<String, ServiceError> {
        build_oauth_url(registration, return_url, &self.scopes)
    }
}
