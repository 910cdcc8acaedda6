//! Role service: resolving identities to permissions.

use dashconf_domain::error::DashConfError;
use dashconf_domain::permission::{CONFIG_ROLES, Identity, PermissionSet};
use dashconf_domain::role::{self, Role};

use crate::ports::{ConfigStore, Store};

/// Reads the `roles` store.
pub struct RoleService<S> {
    store: S,
}

impl<S: ConfigStore> RoleService<S> {
    /// Create a new service backed by the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Resolve `username` into an [`Identity`]: the union of the permissions
    /// of every role listing the user. Anonymous requests get nothing.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the roles cannot be read.
    pub async fn identify(&self, username: Option<&str>) -> Result<Identity, DashConfError> {
        let Some(username) = username else {
            return Ok(Identity::anonymous());
        };
        let roles = self.store.load(Store::Roles).await?;
        Ok(Identity {
            username: Some(username.to_string()),
            permissions: role::permissions_for(&roles, username),
        })
    }

    /// All configured roles.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::Authorization`] without the roles
    /// permission, or a storage error.
    pub async fn list(&self, permissions: &PermissionSet) -> Result<Vec<Role>, DashConfError> {
        permissions.assert(CONFIG_ROLES)?;
        let roles = self.store.load(Store::Roles).await?;
        Ok(role::parse_all(&roles))
    }
}
