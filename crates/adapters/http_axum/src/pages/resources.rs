//! Resource pages: list, create, edit and remove.

use askama::Template;
use axum::extract::{Form, Query, State};
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use dashconf_app::ports::{ConfigStore, ModuleManager, UserBackendFactory};
use dashconf_app::services::FormOutcome;
use dashconf_app::services::resource_service::RemovalOutcome;
use dashconf_domain::form::Submission;
use dashconf_domain::notification::Notification;
use dashconf_domain::permission::PermissionSet;
use dashconf_domain::resource::Resource;
use dashconf_domain::tabs::Tabs;

use super::{FormTemplate, Layout, recover_not_found, render, submission};
use crate::error::PageError;
use crate::flash::{self, Flash};
use crate::identity::CurrentUser;
use crate::state::AppState;

const URL: &str = "/config/resource";

fn layout(
    title: impl Into<String>,
    permissions: &PermissionSet,
    notifications: Vec<Notification>,
) -> Layout {
    Layout::new(
        title,
        Tabs::for_permissions(permissions).activate("resource"),
        notifications,
    )
}

/// Resource list page.
#[derive(Template)]
#[template(path = "resource_list.html")]
pub struct ResourceListTemplate {
    layout: Layout,
    resources: Vec<Resource>,
}

impl IntoResponse for ResourceListTemplate {
    fn into_response(self) -> Response {
        render(&self, !self.layout.notifications.is_empty())
    }
}

/// `?resource=` selector of the edit and remove pages.
#[derive(Debug, Deserialize)]
pub struct ResourceQuery {
    #[serde(default)]
    pub resource: String,
}

/// Render the list page; shared with the configuration index.
pub(crate) async fn page<S, F, M>(
    state: &AppState<S, F, M>,
    user: &CurrentUser,
    notifications: Vec<Notification>,
) -> Result<ResourceListTemplate, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    let resources = state.resource_service.list(user.permissions()).await?;
    Ok(ResourceListTemplate {
        layout: layout("Resources", user.permissions(), notifications),
        resources,
    })
}

/// `GET /config/resource`
pub async fn list<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    flash: Flash,
) -> Result<ResourceListTemplate, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    page(&state, &user, flash.into_inner()).await
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

/// `GET /config/resource/create`
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
        .resource_service
        .create_form(user.permissions(), &Submission::new())?;
    Ok(FormTemplate::new(
        layout("New Resource", user.permissions(), Vec::new()),
        form,
        format!("{URL}/create"),
    )
    .cancel(URL))
}

/// `POST /config/resource/create`
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
        .resource_service
        .create(user.permissions(), &submission(pairs))
        .await?;
    Ok(saved_or_form(
        outcome,
        "New Resource",
        user.permissions(),
        format!("{URL}/create"),
    ))
}

/// `GET /config/resource/edit?resource=`
pub async fn edit_form<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    Query(query): Query<ResourceQuery>,
    uri: Uri,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    match state
        .resource_service
        .edit_form(user.permissions(), &query.resource)
        .await
    {
        Ok(form) => Ok(FormTemplate::new(
            layout(
                format!("Edit Resource \"{}\"", query.resource),
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

/// `POST /config/resource/edit?resource=`
pub async fn edit<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    Query(query): Query<ResourceQuery>,
    uri: Uri,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    match state
        .resource_service
        .edit(user.permissions(), &query.resource, &submission(pairs))
        .await
    {
        Ok(outcome) => Ok(saved_or_form(
            outcome,
            &format!("Edit Resource \"{}\"", query.resource),
            user.permissions(),
            uri.to_string(),
        )),
        Err(err) => recover_not_found(err, URL),
    }
}

/// `GET /config/resource/remove?resource=`: confirmation with a warning
/// per backend still using the resource.
pub async fn removal_form<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    Query(query): Query<ResourceQuery>,
    uri: Uri,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    match state
        .resource_service
        .removal_form(user.permissions(), &query.resource)
        .await
    {
        Ok(form) => Ok(FormTemplate::new(
            layout(
                format!("Remove Resource \"{}\"", query.resource),
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

/// `POST /config/resource/remove?resource=` (PRG)
pub async fn remove<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    Query(query): Query<ResourceQuery>,
    uri: Uri,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    match state
        .resource_service
        .remove(user.permissions(), &query.resource)
        .await
    {
        Ok(RemovalOutcome::Removed(notifications)) => Ok(flash::redirect(URL, &notifications)),
        Ok(RemovalOutcome::Invalid(form)) => Ok(FormTemplate::new(
            layout(
                format!("Remove Resource \"{}\"", query.resource),
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
