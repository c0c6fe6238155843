//! Typed per-entity operations the business layer depends on.

use models::{AppRegistration, EntityId, UserAccount, UserProfile};

use crate::storage::{EntityStore, StoreResult};

/// Persistence operations for Herd's entities.
///
/// Lookups return `Ok(None)` when nothing matches; `Err` means the storage
/// medium failed.
pub trait HerdDataProvider: Send + Sync {
    fn get_app_registration(&self, id: EntityId) -> StoreResult<Option<AppRegistration>>;
    fn get_app_registration_by_instance(&self, instance: &str) -> StoreResult<Option<AppRegistration>>;
    fn create_app_registration(&self, registration: AppRegistration) -> StoreResult<AppRegistration>;
    fn update_app_registration(&self, registration: &AppRegistration) -> StoreResult<()>;

    fn get_user(&self, id: EntityId) -> StoreResult<Option<UserAccount>>;
    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>>;
    fn create_user(&self, user: UserAccount) -> StoreResult<UserAccount>;
    fn update_user(&self, user: &UserAccount) -> StoreResult<()>;

    fn get_profile(&self, id: EntityId) -> StoreResult<Option<UserProfile>>;
    fn create_profile(&self, profile: UserProfile) -> StoreResult<UserProfile>;
    fn update_profile(&self, profile: &UserProfile) -> StoreResult<()>;
}

impl HerdDataProvider for EntityStore {
    fn get_app_registration(&self, id: EntityId) -> StoreResult<Option<AppRegistration>> {
        self.get_by_id(id)
    }

    fn get_app_registration_by_instance(&self, instance: &str) -> StoreResult<Option<AppRegistration>> {
        self.find(|r: &AppRegistration| r.instance == instance)
    }

    fn create_app_registration(&self, registration: AppRegistration) -> StoreResult<AppRegistration> {
        self.create(registration)
    }

    fn update_app_registration(&self, registration: &AppRegistration) -> StoreResult<()> {
        self.update(registration)
    }

    fn get_user(&self, id: EntityId) -> StoreResult<Option<UserAccount>> {
        self.get_by_id(id)
    }

    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        self.find(|u: &UserAccount| u.has_email(email))
    }

    fn create_user(&self, user: UserAccount) -> StoreResult<UserAccount> {
        self.create(user)
    }

    fn update_user(&self, user: &UserAccount) -> StoreResult<()> {
        self.update(user)
    }

    fn get_profile(&self, id: EntityId) -> StoreResult<Option<UserProfile>> {
        self.get_by_id(id)
    }

    fn create_profile(&self, profile: UserProfile) -> StoreResult<UserProfile> {
        self.create(profile)
    }

    fn update_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.update(profile)
    }
}
