//! Herd's business layer: user accounts and Mastodon app registrations.
//!
//! Commands validate input, talk to the data provider and the Mastodon API,
//! and report failures as [`ServiceError`](crate::errors::ServiceError).

pub mod domain;
pub mod service;
pub mod token;

pub use service::{HerdApp, HerdAppConfig};
