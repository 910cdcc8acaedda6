//! User-backend error type wrapping sqlx and hashing errors.

use dashconf_domain::error::DashConfError;
use dashconf_domain::resource::DbType;

/// Errors originating from the user backend.
#[derive(Debug, thiserror::Error)]
pub enum UserBackendError {
    /// A query or connection failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The password could not be hashed.
    #[error("unable to hash password: {0}")]
    PasswordHash(argon2::password_hash::Error),

    /// The resource uses a SQL driver this build cannot reach.
    #[error("the {} driver is not supported for user backends", .0.label())]
    UnsupportedDriver(DbType),

    /// The authentication backend kind has no user store here.
    #[error("listing users of {0} backends is not supported")]
    UnsupportedBackend(&'static str),

    /// The backend references a resource of the wrong type.
    #[error("backend \"{backend}\" cannot use resource \"{resource}\"")]
    ResourceMismatch { backend: String, resource: String },
}

impl From<UserBackendError> for DashConfError {
    fn from(err: UserBackendError) -> Self {
        Self::Storage(Box::new(err))
    }
}
