//! Module pages: list, detail, enable and disable.

use askama::Template;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use dashconf_app::ports::{ConfigStore, ModuleManager, UserBackendFactory};
use dashconf_domain::error::{DashConfError, ModuleError};
use dashconf_domain::module::Module;
use dashconf_domain::notification::Notification;
use dashconf_domain::tabs::Tabs;

use super::{Layout, recover_not_found, render};
use crate::error::PageError;
use crate::flash::{self, Flash};
use crate::identity::CurrentUser;
use crate::state::AppState;

const URL: &str = "/config/modules";

/// Installed modules page.
#[derive(Template)]
#[template(path = "module_list.html")]
pub struct ModuleListTemplate {
    layout: Layout,
    modules: Vec<Module>,
}

impl IntoResponse for ModuleListTemplate {
    fn into_response(self) -> Response {
        render(&self, !self.layout.notifications.is_empty())
    }
}

/// Single module page.
#[derive(Template)]
#[template(path = "module_detail.html")]
pub struct ModuleDetailTemplate {
    layout: Layout,
    module: Module,
}

impl IntoResponse for ModuleDetailTemplate {
    fn into_response(self) -> Response {
        render(&self, !self.layout.notifications.is_empty())
    }
}

/// Failure of the module manager, shown verbatim.
#[derive(Template)]
#[template(path = "module_error.html")]
pub struct ModuleErrorTemplate {
    layout: Layout,
    error: ModuleError,
}

impl IntoResponse for ModuleErrorTemplate {
    fn into_response(self) -> Response {
        render(&self, false)
    }
}

/// `?name=` selector of the module actions.
#[derive(Debug, Deserialize)]
pub struct ModuleQuery {
    #[serde(default)]
    pub name: String,
}

/// `GET /config/modules`
pub async fn list<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    flash: Flash,
) -> Result<ModuleListTemplate, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    let modules = state.module_service.list(user.permissions()).await?;
    Ok(ModuleListTemplate {
        layout: Layout::new("Modules", Tabs::modules(), flash.into_inner()),
        modules,
    })
}

/// `GET /config/module?name=`
pub async fn detail<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    Query(query): Query<ModuleQuery>,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    match state
        .module_service
        .detail(user.permissions(), &query.name)
        .await
    {
        Ok(module) => Ok(ModuleDetailTemplate {
            layout: Layout::new(format!("Module {}", module.name), Tabs::modules(), Vec::new()),
            module,
        }
        .into_response()),
        Err(err @ DashConfError::Validation(_)) => Ok(flash::redirect(
            URL,
            &[Notification::error(err.to_string())],
        )),
        Err(err) => recover_not_found(err, URL),
    }
}

fn toggled(result: Result<String, DashConfError>) -> Result<Response, PageError> {
    match result {
        Ok(message) => Ok(flash::redirect(URL, &[Notification::success(message)])),
        Err(DashConfError::Module(error)) => {
            tracing::warn!(module = %error.module, error = %error, "module manager refused");
            Ok(ModuleErrorTemplate {
                layout: Layout::new("Module Error", Tabs::modules(), Vec::new()),
                error,
            }
            .into_response())
        }
        Err(err @ DashConfError::Validation(_)) => Ok(flash::redirect(
            URL,
            &[Notification::error(err.to_string())],
        )),
        Err(err) => recover_not_found(err, URL),
    }
}

/// `POST /config/module/enable?name=`: enable and load (PRG).
pub async fn enable<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    Query(query): Query<ModuleQuery>,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    toggled(
        state
            .module_service
            .enable(user.permissions(), &query.name)
            .await,
    )
}

/// `POST /config/module/disable?name=` (PRG)
pub async fn disable<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    Query(query): Query<ModuleQuery>,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    toggled(
        state
            .module_service
            .disable(user.permissions(), &query.name)
            .await,
    )
}
