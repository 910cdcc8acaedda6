//! Read-only role listing, the target of the roles tab.

use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use dashconf_app::ports::{ConfigStore, ModuleManager, UserBackendFactory};
use dashconf_domain::role::Role;
use dashconf_domain::tabs::Tabs;

use super::{Layout, render};
use crate::error::PageError;
use crate::flash::Flash;
use crate::identity::CurrentUser;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "role_list.html")]
pub struct RoleListTemplate {
    layout: Layout,
    roles: Vec<Role>,
}

impl IntoResponse for RoleListTemplate {
    fn into_response(self) -> Response {
        render(&self, !self.layout.notifications.is_empty())
    }
}

/// `GET /roles`
pub async fn list<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    flash: Flash,
) -> Result<RoleListTemplate, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    let roles = state.role_service.list(user.permissions()).await?;
    Ok(RoleListTemplate {
        layout: Layout::new(
            "Roles",
            Tabs::for_permissions(user.permissions()).activate("roles"),
            flash.into_inner(),
        ),
        roles,
    })
}
