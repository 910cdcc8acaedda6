//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use dashconf_app::ports::{ConfigStore, ModuleManager, UserBackendFactory};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Merges the HTML pages at `/`; the setup wizard is only routed when
/// enabled in the state's settings. Includes a [`TraceLayer`] that logs each
/// HTTP request/response using the `tracing` ecosystem.
pub fn build<S, F, M>(state: AppState<S, F, M>) -> Router
where
    S: ConfigStore + Send + Sync + 'static,
    F: UserBackendFactory + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .merge(crate::pages::routes(state.settings.setup_enabled))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
