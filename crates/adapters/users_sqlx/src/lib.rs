//! # dashconf-adapter-users-sqlx
//!
//! User backend for database authentication backends, using
//! [sqlx](https://docs.rs/sqlx) on `SQLite`.
//!
//! ## Responsibilities
//! - Implement `UserBackend` and `UserBackendFactory` from `dashconf-app::ports`
//! - Open the database named by a `db` resource and ensure the user table exists
//! - Hash new passwords with Argon2
//!
//! Other drivers and LDAP directories are reported as unsupported; callers
//! listing users treat that like an empty backend.
//!
//! ## Dependency rule
//! Depends on `dashconf-app` (for port traits) and `dashconf-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod backend;
mod error;

pub use backend::{SqliteUserBackend, SqlxUserBackendFactory};
pub use error::UserBackendError;
