use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use models::{profile, user, AppRegistration, EntityId, UserAccount, UserAccountSecurity, UserProfile};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{CreateUserInput, CreatedUser, LoginInput, UserSession};
use super::token::issue_token;
use crate::data::HerdDataProvider;
use crate::errors::ServiceError;
use crate::mastodon::{normalize_instance, MastodonApi, NON_REDIRECT_URL};

/// HerdApp configuration
#[derive(Clone, Debug)]
pub struct HerdAppConfig {
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: i64,
}

impl Default for HerdAppConfig {
    fn default() -> Self {
        Self { jwt_secret: None, token_ttl_hours: 12 }
    }
}

/// Herd's business commands, independent of web framework.
///
/// Store calls are synchronous and run on the blocking pool.
pub struct HerdApp<D, M: ?Sized> {
    data: Arc<D>,
    api: Arc<M>,
    cfg: HerdAppConfig,
}

impl<D, M> HerdApp<D, M>
where
    D: HerdDataProvider + 'static,
    M: MastodonApi + ?Sized,
{
    pub fn new(data: Arc<D>, api: Arc<M>, cfg: HerdAppConfig) -> Self {
        Self { data, api, cfg }
    }

    pub fn config(&self) -> &HerdAppConfig {
        &self.cfg
    }

    async fn with_data<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&D) -> Result<R, ServiceError> + Send + 'static,
        R: Send + 'static,
    {
        let data = Arc::clone(&self.data);
        tokio::task::spawn_blocking(move || f(&*data))
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?
    }

    // ── Users ──────────────────────────────────────────────────────

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: EntityId) -> Result<UserAccount, ServiceError> {
        self.with_data(move |d| d.get_user(id)?.ok_or_else(|| ServiceError::not_found("user")))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, id: EntityId) -> Result<UserProfile, ServiceError> {
        self.with_data(move |d| d.get_profile(id)?.ok_or_else(|| ServiceError::not_found("profile")))
            .await
    }

    /// Register a new account with a hashed password and an empty profile.
    ///
    /// # Examples
    /// ```
    /// use service::app::{HerdApp, HerdAppConfig, domain::CreateUserInput};
    /// use service::mastodon::mock::MockMastodonApi;
    /// use service::storage::EntityStore;
    /// use std::sync::Arc;
    /// let rt = tokio::runtime::Runtime::new().unwrap();
    /// let app = HerdApp::new(Arc::new(EntityStore::in_memory()), Arc::new(MockMastodonApi::default()), HerdAppConfig::default());
    /// let input = CreateUserInput { email: "user@example.com".into(), password: "Secret123".into(), first_name: "Test".into(), last_name: "User".into() };
    /// let created = rt.block_on(app.create_user(input)).unwrap();
    /// assert_eq!(created.user.id, 1);
    /// assert_eq!(created.user.profile_id, created.profile.id);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: CreateUserInput) -> Result<CreatedUser, ServiceError> {
        user::validate_email(&input.email)?;
        user::validate_password(&input.password)?;
        profile::validate_name(&input.first_name)?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| ServiceError::Hash(e.to_string()))?
            .to_string();

        let email = input.email.trim().to_string();
        let created = self
            .with_data(move |d| {
                if let Some(existing) = d.get_user_by_email(&email)? {
                    debug!(user_id = existing.id, "email already registered");
                    return Err(ServiceError::Conflict("That email address has already been taken".into()));
                }
                let mut user = d.create_user(UserAccount {
                    email,
                    security: UserAccountSecurity { salt_key: 0, salted_password: hash },
                    ..Default::default()
                })?;
                let profile = d.create_profile(UserProfile {
                    user_id: user.id,
                    first_name: input.first_name.trim().to_string(),
                    last_name: input.last_name.trim().to_string(),
                    ..Default::default()
                })?;
                user.profile_id = profile.id;
                d.update_user(&user)?;
                Ok(CreatedUser { user, profile })
            })
            .await?;

        info!(user_id = created.user.id, profile_id = created.profile.id, "user_registered");
        Ok(created)
    }

    /// Check credentials; issue a session token when a secret is configured.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login_user(&self, input: LoginInput) -> Result<UserSession, ServiceError> {
        let wrong = || ServiceError::Unauthorized("Wrong email or password".into());
        let email = input.email.clone();
        let user = self
            .with_data(move |d| Ok(d.get_user_by_email(&email)?))
            .await?
            .ok_or_else(wrong)?;

        let parsed = PasswordHash::new(&user.security.salted_password).map_err(|_| wrong())?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(wrong());
        }

        let token = match &self.cfg.jwt_secret {
            Some(secret) => Some(issue_token(secret, &user, self.cfg.token_ttl_hours)?),
            None => None,
        };
        info!(user_id = user.id, "user_logged_in");
        Ok(UserSession { user, token })
    }

    // ── App registrations ──────────────────────────────────────────

    #[instrument(skip(self))]
    pub async fn get_registration(&self, id: EntityId) -> Result<AppRegistration, ServiceError> {
        self.with_data(move |d| {
            d.get_app_registration(id)?.ok_or_else(|| ServiceError::not_found("app registration"))
        })
        .await
    }

    /// Stored registration for `instance`, registering Herd with the instance
    /// first if there is none.
    ///
    /// Two concurrent first calls for one instance may both register; the
    /// later one is stored under its own ID.
    #[instrument(skip(self))]
    pub async fn get_or_create_registration(&self, instance: &str) -> Result<AppRegistration, ServiceError> {
        let instance = normalize_instance(instance);
        if instance.is_empty() {
            return Err(ServiceError::Validation("instance required".into()));
        }

        let lookup = instance.clone();
        if let Some(existing) = self
            .with_data(move |d| Ok(d.get_app_registration_by_instance(&lookup)?))
            .await?
        {
            return Ok(existing);
        }

        let mut registration = self.api.register_app(&instance).await?;
        registration.instance = instance;
        let created = self
            .with_data(move |d| Ok(d.create_app_registration(registration)?))
            .await?;
        info!(registration_id = created.id, instance = %created.instance, "app_registration_created");
        Ok(created)
    }

    /// Authorize URL for a stored registration. A blank `return_url` falls
    /// back to the out-of-band redirect.
    #[instrument(skip(self))]
    pub async fn get_oauth_url(
        &self,
        registration_id: EntityId,
        return_url: Option<&str>,
    ) -> Result<String, ServiceError> {
        let return_url = match return_url.map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => NON_REDIRECT_URL.to_string(),
        };
        let registration = self
            .with_data(move |d| Ok(d.get_app_registration(registration_id)?))
            .await?
            .ok_or_else(|| ServiceError::Validation("No app registration with that ID".into()))?;
        self.api.oauth_url(&registration, &return_url)
    }
}
