//! General settings page.

use axum::extract::{Form, State};
use axum::response::{IntoResponse, Response};

use dashconf_app::ports::{ConfigStore, ModuleManager, UserBackendFactory};
use dashconf_app::services::FormOutcome;
use dashconf_domain::notification::Notification;
use dashconf_domain::permission::PermissionSet;
use dashconf_domain::tabs::Tabs;

use super::{FormTemplate, Layout, submission};
use crate::error::PageError;
use crate::flash::{self, Flash};
use crate::identity::CurrentUser;
use crate::state::AppState;

const URL: &str = "/config/application";
const TITLE: &str = "Application";

fn layout(permissions: &PermissionSet, notifications: Vec<Notification>) -> Layout {
    Layout::new(
        TITLE,
        Tabs::for_permissions(permissions).activate("application"),
        notifications,
    )
}

/// Render the settings form; shared with the configuration index.
pub(crate) async fn page<S, F, M>(
    state: &AppState<S, F, M>,
    user: &CurrentUser,
    notifications: Vec<Notification>,
) -> Result<FormTemplate, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    let form = state.application_service.form(user.permissions()).await?;
    Ok(FormTemplate::new(
        layout(user.permissions(), notifications),
        form,
        URL,
    ))
}

/// `GET /config/application`
pub async fn show<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    flash: Flash,
) -> Result<FormTemplate, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    page(&state, &user, flash.into_inner()).await
}

/// `POST /config/application`: store the settings (PRG) or re-render.
pub async fn submit<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    let submission = submission(pairs);
    match state
        .application_service
        .submit(user.permissions(), &submission)
        .await?
    {
        FormOutcome::Saved(message) => {
            Ok(flash::redirect(URL, &[Notification::success(message)]))
        }
        FormOutcome::Invalid(form) => Ok(FormTemplate::new(
            layout(user.permissions(), Vec::new()),
            form,
            URL,
        )
        .into_response()),
    }
}
