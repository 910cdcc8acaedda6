//! Server-side rendered HTML pages (no JavaScript).
//!
//! - `GET  /config`                          first accessible section
//! - `GET|POST /config/application`          general settings
//! - `GET|POST /config/authentication`       backend chain and reordering
//! - `GET|POST /config/authentication/{create,edit,remove}`
//! - `GET  /config/resource`                 resource list
//! - `GET|POST /config/resource/{create,edit,remove}`
//! - `GET  /config/modules`, `GET /config/module`
//! - `POST /config/module/{enable,disable}`
//! - `GET  /roles`                           role list
//! - `GET|POST /setup/{admin-account,monitoring-backend}` while setup is on

#[allow(clippy::missing_errors_doc)]
pub mod application;
#[allow(clippy::missing_errors_doc)]
pub mod authentication;
#[allow(clippy::missing_errors_doc)]
pub mod config;
#[allow(clippy::missing_errors_doc)]
pub mod modules;
#[allow(clippy::missing_errors_doc)]
pub mod resources;
#[allow(clippy::missing_errors_doc)]
pub mod roles;
#[allow(clippy::missing_errors_doc)]
pub mod setup;

use askama::Template;
use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};

use dashconf_app::ports::{ConfigStore, ModuleManager, UserBackendFactory};
use dashconf_domain::error::DashConfError;
use dashconf_domain::form::{FormSpec, Submission};
use dashconf_domain::notification::Notification;
use dashconf_domain::tabs::Tabs;

use crate::error::PageError;
use crate::flash::{self, CLEAR_COOKIE};
use crate::state::AppState;

/// Render `page`, expiring the flash cookie once its notifications are shown.
pub(crate) fn render<T: Template>(page: &T, shows_flash: bool) -> Response {
    match page.render() {
        Ok(html) if shows_flash => {
            ([(header::SET_COOKIE, CLEAR_COOKIE)], Html(html)).into_response()
        }
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to render template");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error",
            )
                .into_response()
        }
    }
}

/// The frame shared by every page: title, tabs and pending notifications.
pub struct Layout {
    pub title: String,
    pub tabs: Tabs,
    pub notifications: Vec<Notification>,
}

impl Layout {
    pub fn new(title: impl Into<String>, tabs: Tabs, notifications: Vec<Notification>) -> Self {
        Self {
            title: title.into(),
            tabs,
            notifications,
        }
    }
}

/// A declarative form rendered field by field.
#[derive(Template)]
#[template(path = "form.html")]
pub struct FormTemplate {
    pub layout: Layout,
    pub form: FormSpec,
    /// Target of the form's POST.
    pub action: String,
    /// Where the cancel link leads, if anywhere.
    pub cancel: Option<String>,
}

impl FormTemplate {
    pub fn new(layout: Layout, form: FormSpec, action: impl Into<String>) -> Self {
        Self {
            layout,
            form,
            action: action.into(),
            cancel: None,
        }
    }

    #[must_use]
    pub fn cancel(mut self, url: impl Into<String>) -> Self {
        self.cancel = Some(url.into());
        self
    }
}

impl IntoResponse for FormTemplate {
    fn into_response(self) -> Response {
        render(&self, !self.layout.notifications.is_empty())
    }
}

/// Collect url-encoded pairs into a [`Submission`].
pub(crate) fn submission(pairs: Vec<(String, String)>) -> Submission {
    pairs.into_iter().collect()
}

/// Turn a missing entity into an error notification on the section
/// listing; anything else stays an error page.
pub(crate) fn recover_not_found(err: DashConfError, listing: &str) -> Result<Response, PageError> {
    match err {
        DashConfError::NotFound(err) => {
            tracing::warn!(error = %err, "requested entry does not exist");
            Ok(flash::redirect(listing, &[Notification::error(err.to_string())]))
        }
        other => Err(other.into()),
    }
}

/// Build the sub-router for all HTML pages.
pub fn routes<S, F, M>(setup_enabled: bool) -> Router<AppState<S, F, M>>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    let router = Router::new()
        .route("/config", get(config::index::<S, F, M>))
        .route(
            "/config/application",
            get(application::show::<S, F, M>).post(application::submit::<S, F, M>),
        )
        .route(
            "/config/authentication",
            get(authentication::list::<S, F, M>).post(authentication::reorder::<S, F, M>),
        )
        .route(
            "/config/authentication/create",
            get(authentication::create_form::<S, F, M>).post(authentication::create::<S, F, M>),
        )
        .route(
            "/config/authentication/edit",
            get(authentication::edit_form::<S, F, M>).post(authentication::edit::<S, F, M>),
        )
        .route(
            "/config/authentication/remove",
            get(authentication::removal_form::<S, F, M>).post(authentication::remove::<S, F, M>),
        )
        .route("/config/resource", get(resources::list::<S, F, M>))
        .route(
            "/config/resource/create",
            get(resources::create_form::<S, F, M>).post(resources::create::<S, F, M>),
        )
        .route(
            "/config/resource/edit",
            get(resources::edit_form::<S, F, M>).post(resources::edit::<S, F, M>),
        )
        .route(
            "/config/resource/remove",
            get(resources::removal_form::<S, F, M>).post(resources::remove::<S, F, M>),
        )
        .route("/config/modules", get(modules::list::<S, F, M>))
        .route("/config/module", get(modules::detail::<S, F, M>))
        .route("/config/module/enable", post(modules::enable::<S, F, M>))
        .route("/config/module/disable", post(modules::disable::<S, F, M>))
        .route("/roles", get(roles::list::<S, F, M>));

    if !setup_enabled {
        return router;
    }
    router
        .route(
            "/setup/admin-account",
            get(setup::admin_account_form::<S, F, M>).post(setup::admin_account::<S, F, M>),
        )
        .route(
            "/setup/monitoring-backend",
            get(setup::monitoring_backend_form::<S, F, M>)
                .post(setup::monitoring_backend::<S, F, M>),
        )
}
