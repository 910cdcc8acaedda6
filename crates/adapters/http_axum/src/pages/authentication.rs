//! Authentication backend pages: the ordered chain, create, edit and remove.

use askama::Template;
use axum::extract::{Form, Query, State};
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use dashconf_app::ports::{ConfigStore, ModuleManager, UserBackendFactory};
use dashconf_app::services::FormOutcome;
use dashconf_app::services::authentication_service::Move;
use dashconf_domain::backend::AuthBackend;
use dashconf_domain::error::{DashConfError, ValidationError};
use dashconf_domain::form::Submission;
use dashconf_domain::forms::confirm_removal;
use dashconf_domain::notification::Notification;
use dashconf_domain::permission::PermissionSet;
use dashconf_domain::tabs::Tabs;

use super::{FormTemplate, Layout, recover_not_found, render, submission};
use crate::error::PageError;
use crate::flash::{self, Flash};
use crate::identity::CurrentUser;
use crate::state::AppState;

const URL: &str = "/config/authentication";

fn layout(
    title: impl Into<String>,
    permissions: &PermissionSet,
    notifications: Vec<Notification>,
) -> Layout {
    Layout::new(
        title,
        Tabs::for_permissions(permissions).activate("authentication"),
        notifications,
    )
}

/// Backend chain page.
#[derive(Template)]
#[template(path = "authentication_list.html")]
pub struct BackendListTemplate {
    layout: Layout,
    backends: Vec<AuthBackend>,
}

impl IntoResponse for BackendListTemplate {
    fn into_response(self) -> Response {
        render(&self, !self.layout.notifications.is_empty())
    }
}

/// `?auth_backend=` selector of the edit and remove pages.
#[derive(Debug, Deserialize)]
pub struct BackendQuery {
    #[serde(default)]
    pub auth_backend: String,
}

/// Reorder request posted from the chain page.
#[derive(Debug, Deserialize)]
pub struct ReorderForm {
    pub auth_backend: String,
    pub direction: String,
}

fn parse_direction(direction: &str) -> Result<Move, ValidationError> {
    match direction {
        "up" => Ok(Move::Up),
        "down" => Ok(Move::Down),
        other => Err(ValidationError::InvalidValue {
            key: "direction",
            value: other.to_string(),
        }),
    }
}

/// Render the chain page; shared with the configuration index.
pub(crate) async fn page<S, F, M>(
    state: &AppState<S, F, M>,
    user: &CurrentUser,
    notifications: Vec<Notification>,
) -> Result<BackendListTemplate, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    let backends = state
        .authentication_service
        .list(user.permissions())
        .await?;
    Ok(BackendListTemplate {
        layout: layout("Authentication", user.permissions(), notifications),
        backends,
    })
}

/// `GET /config/authentication`
pub async fn list<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    flash: Flash,
) -> Result<BackendListTemplate, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    page(&state, &user, flash.into_inner()).await
}

/// `POST /config/authentication`: move one backend up or down (PRG).
pub async fn reorder<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    Form(form): Form<ReorderForm>,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    let direction = parse_direction(&form.direction).map_err(DashConfError::from)?;
    match state
        .authentication_service
        .reorder(user.permissions(), &form.auth_backend, direction)
        .await
    {
        Ok(message) => Ok(flash::redirect(URL, &[Notification::success(message)])),
        Err(err) => recover_not_found(err, URL),
    }
}

fn saved_or_form(
    outcome: FormOutcome,
    title: &str,
    permissions: &PermissionSet,
    action: String,
) -> Response {
    match outcome {
        FormOutcome::Saved(message) => flash::redirect(URL, &[Notification::success(message)]),
        FormOutcome::Invalid(form) => {
            FormTemplate::new(layout(title, permissions, Vec::new()), form, action)
                .cancel(URL)
                .into_response()
        }
    }
}

/// `GET /config/authentication/create`
pub async fn create_form<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
) -> Result<FormTemplate, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    let form = state
        .authentication_service
        .create_form(user.permissions(), &Submission::new())
        .await?;
    Ok(FormTemplate::new(
        layout("New Authentication Backend", user.permissions(), Vec::new()),
        form,
        format!("{URL}/create"),
    )
    .cancel(URL))
}

/// `POST /config/authentication/create`
pub async fn create<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    let outcome = state
        .authentication_service
        .create(user.permissions(), &submission(pairs))
        .await?;
    Ok(saved_or_form(
        outcome,
        "New Authentication Backend",
        user.permissions(),
        format!("{URL}/create"),
    ))
}

/// `GET /config/authentication/edit?auth_backend=`
pub async fn edit_form<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    Query(query): Query<BackendQuery>,
    uri: Uri,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    match state
        .authentication_service
        .edit_form(user.permissions(), &query.auth_backend)
        .await
    {
        Ok(form) => Ok(FormTemplate::new(
            layout(
                format!("Edit Backend \"{}\"", query.auth_backend),
                user.permissions(),
                Vec::new(),
            ),
            form,
            uri.to_string(),
        )
        .cancel(URL)
        .into_response()),
        Err(err) => recover_not_found(err, URL),
    }
}

/// `POST /config/authentication/edit?auth_backend=`
pub async fn edit<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    Query(query): Query<BackendQuery>,
    uri: Uri,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    match state
        .authentication_service
        .edit(user.permissions(), &query.auth_backend, &submission(pairs))
        .await
    {
        Ok(outcome) => Ok(saved_or_form(
            outcome,
            &format!("Edit Backend \"{}\"", query.auth_backend),
            user.permissions(),
            uri.to_string(),
        )),
        Err(err) => recover_not_found(err, URL),
    }
}

/// `GET /config/authentication/remove?auth_backend=`
pub async fn removal_form<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    Query(query): Query<BackendQuery>,
    uri: Uri,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    // The edit form doubles as the existence and permission check.
    if let Err(err) = state
        .authentication_service
        .edit_form(user.permissions(), &query.auth_backend)
        .await
    {
        return recover_not_found(err, URL);
    }
    Ok(FormTemplate::new(
        layout(
            format!("Remove Backend \"{}\"", query.auth_backend),
            user.permissions(),
            Vec::new(),
        ),
        confirm_removal(),
        uri.to_string(),
    )
    .cancel(URL)
    .into_response())
}

/// `POST /config/authentication/remove?auth_backend=` (PRG)
pub async fn remove<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    Query(query): Query<BackendQuery>,
    uri: Uri,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    match state
        .authentication_service
        .remove(user.permissions(), &query.auth_backend)
        .await
    {
        Ok(outcome) => Ok(saved_or_form(
            outcome,
            &format!("Remove Backend \"{}\"", query.auth_backend),
            user.permissions(),
            uri.to_string(),
        )),
        Err(err) => recover_not_found(err, URL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_reorder_direction() {
        assert_eq!(parse_direction("up"), Ok(Move::Up));
        assert_eq!(parse_direction("down"), Ok(Move::Down));
        assert!(parse_direction("sideways").is_err());
    }
}
