//! First-run setup wizard pages.
//!
//! Mounted only while setup is enabled; they carry no tabs.

use axum::extract::{Form, State};
use axum::response::{IntoResponse, Response};

use dashconf_app::ports::{ConfigStore, ModuleManager, UserBackendFactory};
use dashconf_app::services::FormOutcome;
use dashconf_domain::form::{FormSpec, Submission};
use dashconf_domain::notification::Notification;
use dashconf_domain::tabs::Tabs;

use super::{FormTemplate, Layout, submission};
use crate::error::PageError;
use crate::flash::{self, Flash};
use crate::identity::CurrentUser;
use crate::state::AppState;

const ADMIN_ACCOUNT_URL: &str = "/setup/admin-account";
const MONITORING_BACKEND_URL: &str = "/setup/monitoring-backend";
const ADMIN_ACCOUNT_TITLE: &str = "Administration";
const MONITORING_BACKEND_TITLE: &str = "Monitoring Backend";

fn wizard_page(
    title: &str,
    form: FormSpec,
    action: &str,
    notifications: Vec<Notification>,
) -> FormTemplate {
    FormTemplate::new(Layout::new(title, Tabs::default(), notifications), form, action)
}

/// `GET /setup/admin-account`
pub async fn admin_account_form<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    user: CurrentUser,
    flash: Flash,
) -> Result<FormTemplate, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    let form = state
        .setup_service
        .admin_account_form(&Submission::new(), user.username())
        .await?;
    Ok(wizard_page(
        ADMIN_ACCOUNT_TITLE,
        form,
        ADMIN_ACCOUNT_URL,
        flash.into_inner(),
    ))
}

/// `POST /setup/admin-account`: record the account, then continue with
/// the monitoring backend.
pub async fn admin_account<S, F, M>(
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
        .setup_service
        .submit_admin_account(&submission(pairs), user.username())
        .await?;
    Ok(match outcome {
        FormOutcome::Saved(message) => flash::redirect(
            MONITORING_BACKEND_URL,
            &[Notification::success(message)],
        ),
        FormOutcome::Invalid(form) => {
            wizard_page(ADMIN_ACCOUNT_TITLE, form, ADMIN_ACCOUNT_URL, Vec::new()).into_response()
        }
    })
}

/// `GET /setup/monitoring-backend`
pub async fn monitoring_backend_form<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    flash: Flash,
) -> Result<FormTemplate, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    let form = state.setup_service.monitoring_backend_form().await?;
    Ok(wizard_page(
        MONITORING_BACKEND_TITLE,
        form,
        MONITORING_BACKEND_URL,
        flash.into_inner(),
    ))
}

/// `POST /setup/monitoring-backend`: store the backend and hand over to
/// the configuration pages.
pub async fn monitoring_backend<S, F, M>(
    State(state): State<AppState<S, F, M>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, PageError>
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    let outcome = state
        .setup_service
        .submit_monitoring_backend(&submission(pairs))
        .await?;
    Ok(match outcome {
        FormOutcome::Saved(message) => {
            flash::redirect("/config", &[Notification::success(message)])
        }
        FormOutcome::Invalid(form) => wizard_page(
            MONITORING_BACKEND_TITLE,
            form,
            MONITORING_BACKEND_URL,
            Vec::new(),
        )
        .into_response(),
    })
}
