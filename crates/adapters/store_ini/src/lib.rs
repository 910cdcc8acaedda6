//! # dashconf-adapter-store-ini
//!
//! Configuration store backed by INI files, using
//! [rust-ini](https://docs.rs/rust-ini).
//!
//! ## Responsibilities
//! - Implement the `ConfigStore` port defined in `dashconf-app::ports`
//! - Map each store to `<config_dir>/<name>.ini`, keeping section order
//! - Replace files atomically (temp file + rename)
//!
//! ## Dependency rule
//! Depends on `dashconf-app` (for port traits) and `dashconf-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod store;

pub use error::IniStoreError;
pub use store::IniConfigStore;
