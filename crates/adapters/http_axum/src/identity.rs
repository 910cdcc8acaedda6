//! Resolution of the calling identity from the remote-user header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use dashconf_app::ports::{ConfigStore, ModuleManager, UserBackendFactory};
use dashconf_domain::permission::{Identity, PermissionSet};

use crate::error::PageError;
use crate::state::AppState;

/// The caller, with the union of the permissions of its roles.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl CurrentUser {
    #[must_use]
    pub fn permissions(&self) -> &PermissionSet {
        &self.0.permissions
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.0.username.as_deref()
    }
}

impl<S, F, M> FromRequestParts<AppState<S, F, M>> for CurrentUser
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    type Rejection = PageError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S, F, M>,
    ) -> Result<Self, Self::Rejection> {
        let username = parts
            .headers
            .get(state.settings.remote_user_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let identity = state.role_service.identify(username).await?;
        tracing::debug!(user = ?identity.username, "identified caller");
        Ok(Self(identity))
    }
}
