//! Configuration sections and the permission-gated section resolver.

use crate::error::AuthorizationError;
use crate::permission::{
    CONFIG_APPLICATION, CONFIG_AUTHENTICATION, CONFIG_RESOURCES, CONFIG_ROLES, PermissionSet,
};

/// One top-level configuration area, gated by its own permission token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Application,
    Authentication,
    Resource,
    Roles,
}

impl Section {
    /// All sections in resolution priority order.
    pub const PRIORITY: [Self; 4] = [
        Self::Application,
        Self::Authentication,
        Self::Resource,
        Self::Roles,
    ];

    /// Stable identifier used for tabs.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Authentication => "authentication",
            Self::Resource => "resource",
            Self::Roles => "roles",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Application => "Application",
            Self::Authentication => "Authentication",
            Self::Resource => "Resources",
            Self::Roles => "Roles",
        }
    }

    /// Permission token required to access this section.
    #[must_use]
    pub fn permission(self) -> &'static str {
        match self {
            Self::Application => CONFIG_APPLICATION,
            Self::Authentication => CONFIG_AUTHENTICATION,
            Self::Resource => CONFIG_RESOURCES,
            Self::Roles => CONFIG_ROLES,
        }
    }

    /// Relative URL of the section's landing action.
    #[must_use]
    pub fn url(self) -> &'static str {
        match self {
            Self::Application => "config/application",
            Self::Authentication => "config/authentication",
            Self::Resource => "config/resource",
            Self::Roles => "roles",
        }
    }

    /// Whether the landing action is served by the configuration controller
    /// itself rather than by another component.
    #[must_use]
    pub fn is_internal(self) -> bool {
        self.url().starts_with("config/")
    }
}

/// Sections accessible with `permissions`, in priority order.
#[must_use]
pub fn allowed_sections(permissions: &PermissionSet) -> Vec<Section> {
    Section::PRIORITY
        .into_iter()
        .filter(|section| permissions.has(section.permission()))
        .collect()
}

/// The highest-priority accessible section, if any.
#[must_use]
pub fn first_allowed(permissions: &PermissionSet) -> Option<Section> {
    Section::PRIORITY
        .into_iter()
        .find(|section| permissions.has(section.permission()))
}

/// Where the configuration index sends the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexDecision {
    /// Dispatch to the section's action within the same request.
    Forward(Section),
    /// Redirect to a URL owned by another component.
    Redirect(&'static str),
}

/// Resolve the configuration index for `permissions`.
///
/// # Errors
///
/// Returns [`AuthorizationError::NoConfigurationPermission`] when no section
/// is accessible.
pub fn resolve_index(permissions: &PermissionSet) -> Result<IndexDecision, AuthorizationError> {
    let section =
        first_allowed(permissions).ok_or(AuthorizationError::NoConfigurationPermission)?;
    if section.is_internal() {
        Ok(IndexDecision::Forward(section))
    } else {
        Ok(IndexDecision::Redirect(section.url()))
    }
}
