//! User backend port: the users an authentication backend knows about.

use std::future::Future;

use dashconf_domain::backend::AuthBackend;
use dashconf_domain::error::DashConfError;
use dashconf_domain::resource::Resource;

/// A connected user store.
pub trait UserBackend {
    /// Names of all users, sorted.
    fn list_users(&self) -> impl Future<Output = Result<Vec<String>, DashConfError>> + Send;

    /// Number of users.
    fn count_users(&self) -> impl Future<Output = Result<usize, DashConfError>> + Send;

    /// Create an active user with the given clear-text password.
    fn create_user(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), DashConfError>> + Send;
}

/// Builds a [`UserBackend`] from a backend configuration and its resource.
pub trait UserBackendFactory {
    type Backend: UserBackend + Send + Sync;

    /// Connect to the user store described by `backend` and `resource`.
    fn connect(
        &self,
        backend: &AuthBackend,
        resource: &Resource,
    ) -> impl Future<Output = Result<Self::Backend, DashConfError>> + Send;
}
