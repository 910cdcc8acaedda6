//! Reaching the user store behind an authentication backend.

use dashconf_domain::backend::AuthBackend;
use dashconf_domain::document::ConfigDocument;
use dashconf_domain::error::{DashConfError, NotFoundError};
use dashconf_domain::forms::admin_account::UserList;
use dashconf_domain::resource::Resource;

use crate::ports::{UserBackend, UserBackendFactory};

/// Connect to the users of `backend`, resolving its resource in `resources`.
///
/// External backends have no user store and yield [`NotFoundError`].
pub(crate) async fn connect<F: UserBackendFactory>(
    factory: &F,
    backend: &AuthBackend,
    resources: &ConfigDocument,
) -> Result<F::Backend, DashConfError> {
    let name = backend.resource().ok_or_else(|| NotFoundError {
        entity: "User store of backend",
        name: backend.name.clone(),
    })?;
    let section = resources.section(name).ok_or_else(|| NotFoundError {
        entity: "Resource",
        name: name.to_string(),
    })?;
    let resource = Resource::from_section(section)?;
    factory.connect(backend, &resource).await
}

async fn list<F: UserBackendFactory>(
    factory: &F,
    backend: &AuthBackend,
    resources: &ConfigDocument,
) -> Result<Vec<String>, DashConfError> {
    connect(factory, backend, resources).await?.list_users().await
}

/// Fetch the users of `backend`; any failure means "no users".
pub(crate) async fn fetch<F: UserBackendFactory>(
    factory: &F,
    backend: &AuthBackend,
    resources: &ConfigDocument,
) -> UserList {
    if backend.resource().is_none() {
        return UserList::default();
    }
    let result = list(factory, backend, resources).await;
    if let Err(err) = &result {
        tracing::warn!(
            backend = %backend.name,
            error = %err,
            "failed to list users, assuming none"
        );
    }
    UserList::from_fetch(result)
}

/// Count the users of `backend`.
pub(crate) async fn count<F: UserBackendFactory>(
    factory: &F,
    backend: &AuthBackend,
    resources: &ConfigDocument,
) -> Result<usize, DashConfError> {
    connect(factory, backend, resources).await?.count_users().await
}
