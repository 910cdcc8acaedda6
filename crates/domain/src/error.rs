//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`DashConfError`] via `#[from]`.

/// Root error type shared by the domain, application and adapter layers.
#[derive(Debug, thiserror::Error)]
pub enum DashConfError {
    /// The caller lacks the permission required for the requested action.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// A named backend, resource or module does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// A domain invariant was violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The module manager refused an operation.
    #[error(transparent)]
    Module(#[from] ModuleError),

    /// Reading or writing durable state failed.
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Access to a configuration section or action was denied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    /// The caller holds none of the configuration permissions.
    #[error("no permission for configuration")]
    NoConfigurationPermission,

    /// The caller lacks one specific permission token.
    #[error("missing permission \"{0}\"")]
    MissingPermission(&'static str),
}

/// A lookup by name found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} \"{name}\" not found")]
pub struct NotFoundError {
    /// Kind of the missing thing (`Authentication backend`, `Resource`, …).
    pub entity: &'static str,
    /// Name that was looked up.
    pub name: String,
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A name must not be empty.
    #[error("name must not be empty")]
    EmptyName,

    /// A name is already taken within its store.
    #[error("\"{0}\" already exists")]
    DuplicateName(String),

    /// A configuration section lacks a mandatory key.
    #[error("section \"{section}\" is missing the key \"{key}\"")]
    MissingKey {
        /// Section the key was looked up in.
        section: String,
        /// The missing key.
        key: &'static str,
    },

    /// A key carries a value outside its accepted set.
    #[error("invalid value \"{value}\" for \"{key}\"")]
    InvalidValue {
        /// The offending key.
        key: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A module name contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid module name \"{0}\"")]
    InvalidModuleName(String),
}

/// Failure reported by the module manager, displayed verbatim to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ModuleError {
    /// Module the operation targeted.
    pub module: String,
    /// Human-readable failure message.
    pub message: String,
}

impl ModuleError {
    /// Build a module error for `module` with the given message.
    #[must_use]
    pub fn new(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_not_found_with_entity_and_name() {
        let err = NotFoundError {
            entity: "Resource",
            name: "icingaweb_db".to_string(),
        };
        assert_eq!(err.to_string(), "Resource \"icingaweb_db\" not found");
    }

    #[test]
    fn should_convert_authorization_error_into_root() {
        let err: DashConfError = AuthorizationError::NoConfigurationPermission.into();
        assert!(matches!(
            err,
            DashConfError::Authorization(AuthorizationError::NoConfigurationPermission)
        ));
    }

    #[test]
    fn should_display_typed_errors_through_root() {
        let err: DashConfError = NotFoundError {
            entity: "Authentication backend",
            name: "ldap".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Authentication backend \"ldap\" not found");
    }

    #[test]
    fn should_display_module_error_verbatim() {
        let err = ModuleError::new("monitoring", "Cannot enable module \"monitoring\"");
        assert_eq!(err.to_string(), "Cannot enable module \"monitoring\"");
    }
}
