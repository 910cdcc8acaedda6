//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.
//! Gated operations take the caller's [`PermissionSet`] explicitly and assert
//! their token before touching any store.
//!
//! [`PermissionSet`]: dashconf_domain::permission::PermissionSet

pub mod application_service;
pub mod authentication_service;
pub mod module_service;
pub mod resource_service;
pub mod role_service;
pub mod setup_service;
mod users;

#[cfg(test)]
pub(crate) mod testing;

use dashconf_domain::form::FormSpec;

/// Shown on the form when persisting a valid submission failed.
pub const SAVE_FAILED_MESSAGE: &str =
    "Failed to persist the configuration. Please check the log for details.";

/// Result of submitting a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// The change was persisted; carries the success message.
    Saved(String),
    /// The form must be shown again, with its errors attached.
    Invalid(FormSpec),
}

impl FormOutcome {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}
