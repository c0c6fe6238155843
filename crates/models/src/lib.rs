//! Entity records persisted by the Herd key-value store.
//!
//! Every record carries a numeric `ID` and a compile-time namespace used to
//! build its keys. Field names on the wire are PascalCase so stores written by
//! other Herd implementations load without a migration step.

pub mod errors;
pub mod entity;
pub mod app_registration;
pub mod user;
pub mod profile;

pub use app_registration::AppRegistration;
pub use entity::{Entity, EntityId};
pub use profile::UserProfile;
pub use user::{MastodonConnection, UserAccount, UserAccountSecurity};
