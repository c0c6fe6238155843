use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;
use tracing::warn;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub mastodon: MastodonConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Which key-value medium backs the entity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_storage_path")]
    pub path: String,
    #[serde(default = "default_key_root")]
    pub key_root: String,
    #[serde(default = "default_key_delimiter")]
    pub key_delimiter: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
            key_root: default_key_root(),
            key_delimiter: default_key_delimiter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: String::new(), token_ttl_hours: default_token_ttl_hours() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MastodonConfig {
    #[serde(default = "default_client_name")]
    pub client_name: String,
    #[serde(default = "default_scopes")]
    pub scopes: String,
    #[serde(default)]
    pub website: String,
}

impl Default for MastodonConfig {
    fn default() -> Self {
        Self { client_name: default_client_name(), scopes: default_scopes(), website: String::new() }
    }
}

fn default_storage_path() -> String { "data/herd.json".into() }
fn default_key_root() -> String { "Herd".into() }
fn default_key_delimiter() -> String { "/".into() }
fn default_token_ttl_hours() -> i64 { 12 }
fn default_client_name() -> String { "Herd".into() }
fn default_scopes() -> String { "read write follow".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `CONFIG_PATH` (or `config.toml`), falling back to defaults when the
    /// file does not exist, then normalize and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => {
                warn!("config file not found; using defaults");
                AppConfig::default()
            }
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        self.auth.normalize_from_env();
        if self.auth.token_ttl_hours <= 0 {
            return Err(anyhow!("auth.token_ttl_hours must be positive"));
        }
        if self.mastodon.client_name.trim().is_empty() {
            self.mastodon.client_name = default_client_name();
        }
        if self.mastodon.scopes.trim().is_empty() {
            self.mastodon.scopes = default_scopes();
        }
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.key_delimiter.is_empty() {
            return Err(anyhow!("storage.key_delimiter must not be empty"));
        }
        if self.key_delimiter.chars().any(|c| c.is_ascii_digit()) {
            return Err(anyhow!("storage.key_delimiter must not contain digits"));
        }
        if self.key_root.trim().is_empty() {
            return Err(anyhow!("storage.key_root must not be empty"));
        }
        if self.key_root.contains(&self.key_delimiter) {
            return Err(anyhow!("storage.key_root must not contain the key delimiter"));
        }
        if self.backend == StorageBackend::File && self.path.trim().is_empty() {
            return Err(anyhow!("storage.path is required for the file backend"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("HERD_JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
    }

    /// `None` when no secret is configured; logins then succeed without a token.
    pub fn secret(&self) -> Option<&str> {
        let s = self.jwt_secret.trim();
        (!s.is_empty()).then_some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let mut cfg = load_from_str("").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.storage.backend, StorageBackend::File);
        assert_eq!(cfg.storage.key_root, "Herd");
        assert_eq!(cfg.storage.key_delimiter, "/");
        assert_eq!(cfg.auth.token_ttl_hours, 12);
        assert_eq!(cfg.mastodon.scopes, "read write follow");
    }

    #[test]
    fn parses_all_sections() {
        let toml = r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            worker_threads = 0

            [storage]
            backend = "memory"
            key_root = "Test"
            key_delimiter = "::"

            [auth]
            jwt_secret = "s3cret"

            [mastodon]
            client_name = "Herd Dev"
        "#;
        let mut cfg = load_from_str(toml).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert_eq!(cfg.storage.key_delimiter, "::");
        assert_eq!(cfg.auth.secret(), Some("s3cret"));
        assert_eq!(cfg.mastodon.client_name, "Herd Dev");
    }

    #[test]
    fn rejects_bad_storage_settings() {
        let mut cfg = AppConfig::default();
        cfg.storage.key_delimiter = String::new();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.storage.key_delimiter = "1".into();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.storage.key_root = "Herd/Root".into();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(load_from_str("[storage]\nbackend = \"registry\"").is_err());
    }

    #[test]
    fn reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("herd_config_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]\nhost = \"localhost\"\nport = 7000\n").unwrap();
        let cfg = load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 7000);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_from_file("/nonexistent/herd/config.toml").unwrap_err();
        assert!(is_not_found(&err));
    }
}
