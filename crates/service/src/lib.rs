//! Service layer for Herd.
//! - `storage`: key-value backends and the typed entity store built on them.
//! - `data`: per-entity operations the business layer depends on.
//! - `mastodon`: boundary to the Mastodon API.
//! - `app`: business commands (accounts, app registrations).

pub mod errors;
pub mod storage;
pub mod data;
pub mod mastodon;
pub mod app;
pub mod runtime;
