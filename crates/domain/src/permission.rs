//! Permission tokens and the per-request permission set.

use std::collections::BTreeSet;

use crate::error::AuthorizationError;

/// Grants access to the application configuration form.
pub const CONFIG_APPLICATION: &str = "system/config/application";
/// Grants access to the authentication backend configuration.
pub const CONFIG_AUTHENTICATION: &str = "system/config/authentication";
/// Grants access to the resource configuration.
pub const CONFIG_RESOURCES: &str = "system/config/resources";
/// Grants access to the roles listing.
pub const CONFIG_ROLES: &str = "system/config/roles";
/// Grants access to module management.
pub const CONFIG_MODULES: &str = "system/config/modules";

/// The set of capability tokens held by the current identity.
///
/// A granted token matches a requested one when both are equal, when the
/// grant is `*`, or when the grant ends in `/*` and the requested token lies
/// below that prefix (`system/config/*` covers `system/config/roles`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    grants: BTreeSet<String>,
}

impl PermissionSet {
    /// An empty permission set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a granted token.
    pub fn grant(&mut self, token: impl Into<String>) {
        self.grants.insert(token.into());
    }

    /// Whether `token` is covered by any grant.
    #[must_use]
    pub fn has(&self, token: &str) -> bool {
        self.grants.iter().any(|grant| grant_matches(grant, token))
    }

    /// Fail with [`AuthorizationError::MissingPermission`] unless `token` is
    /// granted.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::MissingPermission`] when `token` is not
    /// covered by any grant.
    pub fn assert(&self, token: &'static str) -> Result<(), AuthorizationError> {
        if self.has(token) {
            Ok(())
        } else {
            Err(AuthorizationError::MissingPermission(token))
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Iterate over the raw grants in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.grants.iter().map(String::as_str)
    }
}

impl<T: Into<String>> FromIterator<T> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            grants: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<T: Into<String>> Extend<T> for PermissionSet {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.grants.extend(iter.into_iter().map(Into::into));
    }
}

fn grant_matches(grant: &str, token: &str) -> bool {
    if grant == "*" || grant == token {
        return true;
    }
    grant.strip_suffix("/*").is_some_and(|prefix| {
        token
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// The acting identity: a user name (possibly anonymous) and its grants.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    /// Authenticated user name, `None` when the request is anonymous.
    pub username: Option<String>,
    /// Permissions resolved for the user.
    pub permissions: PermissionSet,
}

impl Identity {
    /// An identity without name or permissions.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}
