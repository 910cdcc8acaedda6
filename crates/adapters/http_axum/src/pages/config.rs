//! The configuration index.

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};

use dashconf_app::ports::{ConfigStore, ModuleManager, UserBackendFactory};
use dashconf_domain::error::DashConfError;
use dashconf_domain::section::{IndexDecision, Section, resolve_index};

use super::{application, authentication, resources};
use crate::error::PageError;
use crate::flash::Flash;
use crate::identity::CurrentUser;
use crate::state::AppState;

/// `GET /config`: render the first accessible section in place, or
/// redirect when it is served elsewhere.
pub async fn index<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    flash: Flash,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    let decision = resolve_index(user.permissions()).map_err(DashConfError::from)?;
    let notifications = flash.into_inner();
    let response = match decision {
        IndexDecision::Forward(Section::Application) => {
            application::page(&state, &user, notifications)
                .await?
                .into_response()
        }
        IndexDecision::Forward(Section::Authentication) => {
            authentication::page(&state, &user, notifications)
                .await?
                .into_response()
        }
        IndexDecision::Forward(Section::Resource) => resources::page(&state, &user, notifications)
            .await?
            .into_response(),
        IndexDecision::Forward(Section::Roles) => Redirect::to("/roles").into_response(),
        IndexDecision::Redirect(url) => Redirect::to(&format!("/{url}")).into_response(),
    };
    Ok(response)
}
