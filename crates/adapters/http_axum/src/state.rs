//! Shared application state for axum handlers.

use std::sync::Arc;

use dashconf_app::ports::{ConfigStore, ModuleManager, UserBackendFactory};
use dashconf_app::services::application_service::ApplicationService;
use dashconf_app::services::authentication_service::AuthenticationService;
use dashconf_app::services::module_service::ModuleService;
use dashconf_app::services::resource_service::ResourceService;
use dashconf_app::services::role_service::RoleService;
use dashconf_app::services::setup_service::SetupService;

/// Request handling knobs owned by the HTTP layer.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Header carrying the externally authenticated user name.
    pub remote_user_header: String,
    /// Whether the `/setup` pages are mounted.
    pub setup_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            remote_user_header: "x-remote-user".to_string(),
            setup_enabled: false,
        }
    }
}

/// Application state shared across all axum handlers.
///
/// Generic over the configuration store, the user backend factory and the
/// module manager to avoid dynamic dispatch. `Clone` is implemented manually
/// so the underlying types themselves do not need to be `Clone`.
pub struct AppState<S, F, M> {
    pub application_service: Arc<ApplicationService<S>>,
    pub authentication_service: Arc<AuthenticationService<S, F>>,
    pub resource_service: Arc<ResourceService<S>>,
    pub module_service: Arc<ModuleService<M>>,
    pub role_service: Arc<RoleService<S>>,
    pub setup_service: Arc<SetupService<S, F>>,
    pub settings: Arc<Settings>,
}

impl<S, F, M> Clone for AppState<S, F, M> {
    fn clone(&self) -> Self {
        Self {
            application_service: Arc::clone(&self.application_service),
            authentication_service: Arc::clone(&self.authentication_service),
            resource_service: Arc::clone(&self.resource_service),
            module_service: Arc::clone(&self.module_service),
            role_service: Arc::clone(&self.role_service),
            setup_service: Arc::clone(&self.setup_service),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<S, F, M> AppState<S, F, M>
where
    S: ConfigStore + Clone + Send + Sync + 'static,
    F: UserBackendFactory + Clone + Send + Sync + 'static,
    M: ModuleManager + Send + Sync + 'static,
{
    /// Wire every service onto the same store and user backend factory.
    pub fn new(store: S, users: F, modules: M, mut settings: Settings) -> Self {
        settings.remote_user_header.make_ascii_lowercase();
        Self {
            application_service: Arc::new(ApplicationService::new(store.clone())),
            authentication_service: Arc::new(AuthenticationService::new(
                store.clone(),
                users.clone(),
            )),
            resource_service: Arc::new(ResourceService::new(store.clone())),
            module_service: Arc::new(ModuleService::new(modules)),
            role_service: Arc::new(RoleService::new(store.clone())),
            setup_service: Arc::new(SetupService::new(store, users)),
            settings: Arc::new(settings),
        }
    }
}
