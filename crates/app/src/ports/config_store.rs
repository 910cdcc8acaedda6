//! Configuration store port: named INI-style documents.

use std::future::Future;
use std::sync::Arc;

use dashconf_domain::document::ConfigDocument;
use dashconf_domain::error::DashConfError;

/// The configuration documents known to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Store {
    /// General application settings.
    Config,
    /// Authentication backends, in chain order.
    Authentication,
    /// Named connection configurations.
    Resources,
    /// Roles granting permissions to users.
    Roles,
    /// Backends of the monitoring module.
    MonitoringBackends,
}

impl Store {
    /// Store name relative to the configuration directory, without extension.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Authentication => "authentication",
            Self::Resources => "resources",
            Self::Roles => "roles",
            Self::MonitoringBackends => "modules/monitoring/backends",
        }
    }
}

/// Loads and saves whole configuration documents.
pub trait ConfigStore {
    /// Load `store`. A store that was never written yields an empty document.
    fn load(&self, store: Store)
    -> impl Future<Output = Result<ConfigDocument, DashConfError>> + Send;

    /// Replace `store` with `document`.
    fn save(
        &self,
        store: Store,
        document: &ConfigDocument,
    ) -> impl Future<Output = Result<(), DashConfError>> + Send;
}

impl<T: ConfigStore + Send + Sync> ConfigStore for Arc<T> {
    fn load(
        &self,
        store: Store,
    ) -> impl Future<Output = Result<ConfigDocument, DashConfError>> + Send {
        (**self).load(store)
    }

    fn save(
        &self,
        store: Store,
        document: &ConfigDocument,
    ) -> impl Future<Output = Result<(), DashConfError>> + Send {
        (**self).save(store, document)
    }
}
