//! Setup service: the first-run wizard pages.
//!
//! These pages run before any role exists, so they are not permission
//! gated; the HTTP layer only mounts them while setup is enabled.

use dashconf_domain::backend::{AuthBackend, BackendKind};
use dashconf_domain::document::ConfigDocument;
use dashconf_domain::error::DashConfError;
use dashconf_domain::form::{FormSpec, Submission};
use dashconf_domain::forms::admin_account::{self, AdminAccount, NEW_USER, UserList};
use dashconf_domain::forms::monitoring_backend;
use dashconf_domain::forms::{NAME, submission_from_section};
use dashconf_domain::resource;
use dashconf_domain::role::Role;

use crate::ports::{ConfigStore, Store, UserBackend, UserBackendFactory};
use crate::services::{FormOutcome, SAVE_FAILED_MESSAGE, users};

/// Use-cases of the setup wizard.
pub struct SetupService<S, F> {
    store: S,
    users: F,
}

impl<S: ConfigStore, F: UserBackendFactory> SetupService<S, F> {
    /// Create a new service backed by the given store and user backends.
    pub fn new(store: S, users: F) -> Self {
        Self { store, users }
    }

    /// The backend heading the authentication chain.
    ///
    /// Without any configured backend the wizard falls back to external
    /// authentication, where the account is only named.
    async fn primary_backend(&self) -> Result<AuthBackend, DashConfError> {
        let doc = self.store.load(Store::Authentication).await?;
        Ok(doc
            .sections()
            .find_map(|section| AuthBackend::from_section(section).ok())
            .unwrap_or_else(|| AuthBackend {
                name: "autologin".to_string(),
                kind: BackendKind::External {
                    strip_username_regexp: None,
                },
            }))
    }

    async fn admin_context(
        &self,
    ) -> Result<(AuthBackend, ConfigDocument, UserList), DashConfError> {
        let backend = self.primary_backend().await?;
        let resources = self.store.load(Store::Resources).await?;
        let users = users::fetch(&self.users, &backend, &resources).await;
        Ok((backend, resources, users))
    }

    /// The admin account page for the primary backend.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the stores cannot be read.
    #[tracing::instrument(skip(self, submission))]
    pub async fn admin_account_form(
        &self,
        submission: &Submission,
        remote_user: Option<&str>,
    ) -> Result<FormSpec, DashConfError> {
        let (backend, _, users) = self.admin_context().await?;
        Ok(admin_account::build(&backend, &users, submission, remote_user))
    }

    /// Validate the admin account page and record the account.
    ///
    /// The account is granted every permission through the `Administrators`
    /// role; a new user is created in the database backend first.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the stores cannot be read.
    #[tracing::instrument(skip(self, submission))]
    pub async fn submit_admin_account(
        &self,
        submission: &Submission,
        remote_user: Option<&str>,
    ) -> Result<FormOutcome, DashConfError> {
        let (backend, resources, users) = self.admin_context().await?;
        let mut form = admin_account::build(&backend, &users, submission, remote_user);
        let Some(account) = admin_account::process(&mut form, submission, &users) else {
            return Ok(FormOutcome::Invalid(form));
        };

        if let AdminAccount::NewUser { username, password } = &account {
            let created = match users::connect(&self.users, &backend, &resources).await {
                Ok(store) => store.create_user(username, password).await,
                Err(err) => Err(err),
            };
            if let Err(err) = created {
                tracing::error!(
                    error = %err,
                    user = %username,
                    "failed to create administrative account"
                );
                form.add_error(NEW_USER, format!("Failed to create user: {err}"));
                return Ok(FormOutcome::Invalid(form));
            }
        }

        let mut roles = self.store.load(Store::Roles).await?;
        roles.set_section(Role::administrators(account.username()).to_section());
        if let Err(err) = self.store.save(Store::Roles, &roles).await {
            tracing::error!(error = %err, "failed to save roles");
            form.add_form_error(SAVE_FAILED_MESSAGE);
            return Ok(FormOutcome::Invalid(form));
        }

        tracing::info!(user = account.username(), "administrative account configured");
        Ok(FormOutcome::Saved(format!(
            "Administrative account \"{}\" has been configured",
            account.username()
        )))
    }

    async fn ido_available(&self) -> Result<bool, DashConfError> {
        let resources = self.store.load(Store::Resources).await?;
        Ok(!resource::names_of_type(&resources, "db").is_empty())
    }

    /// The monitoring backend page, pre-filled with the stored backend.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the stores cannot be read.
    pub async fn monitoring_backend_form(&self) -> Result<FormSpec, DashConfError> {
        let stored = self.store.load(Store::MonitoringBackends).await?;
        let effective = stored
            .sections()
            .next()
            .map(submission_from_section)
            .unwrap_or_default();
        Ok(monitoring_backend::build(&effective, self.ido_available().await?))
    }

    /// Validate and store the monitoring backend.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the stores cannot be read.
    #[tracing::instrument(skip_all)]
    pub async fn submit_monitoring_backend(
        &self,
        submission: &Submission,
    ) -> Result<FormOutcome, DashConfError> {
        let mut form = monitoring_backend::build(submission, self.ido_available().await?);
        let Some(backend) = monitoring_backend::process(&mut form, submission) else {
            return Ok(FormOutcome::Invalid(form));
        };

        let mut doc = self.store.load(Store::MonitoringBackends).await?;
        doc.set_section(backend.to_section());
        if let Err(err) = self.store.save(Store::MonitoringBackends, &doc).await {
            tracing::error!(error = %err, "failed to save monitoring backends");
            form.add_error(NAME, SAVE_FAILED_MESSAGE);
            return Ok(FormOutcome::Invalid(form));
        }

        tracing::info!(
            backend = %backend.name,
            kind = backend.kind.as_str(),
            "monitoring backend configured"
        );
        Ok(FormOutcome::Saved(format!(
            "Monitoring backend \"{}\" has been configured",
            backend.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{MemoryStore, StubFactory, doc};
    use dashconf_domain::form::FieldKind;
    use dashconf_domain::forms::admin_account::{
        BY_NAME, DUPLICATE_USERNAME_MESSAGE, EXISTING_USER, NEW_USER_2NDPASS, NEW_USER_PASSWORD,
        USER_TYPE,
    };
    use dashconf_domain::role::ADMINISTRATORS_ROLE;

    fn db_store() -> MemoryStore {
        MemoryStore::default()
            .with(
                Store::Resources,
                doc(&[(
                    "web_db",
                    &[("type", "db"), ("db", "sqlite"), ("dbname", "/tmp/web.db")],
                )]),
            )
            .with(
                Store::Authentication,
                doc(&[("web", &[("backend", "db"), ("resource", "web_db")])]),
            )
    }

    fn new_user(name: &str) -> Submission {
        Submission::new()
            .with(USER_TYPE, NEW_USER)
            .with(NEW_USER, name)
            .with(NEW_USER_PASSWORD, "pw")
            .with(NEW_USER_2NDPASS, "pw")
    }

    #[tokio::test]
    async fn should_offer_radio_when_db_backend_has_users() {
        let svc = SetupService::new(db_store(), StubFactory::with_users(&["alice"]));
        let form = svc
            .admin_account_form(&Submission::new(), None)
            .await
            .unwrap();
        assert_eq!(form.field(USER_TYPE).unwrap().kind, FieldKind::Radio);
        assert!(form.has_field(EXISTING_USER));
    }

    #[tokio::test]
    async fn should_fail_open_when_backend_is_unreachable() {
        let svc = SetupService::new(db_store(), StubFactory::unreachable());
        let form = svc
            .admin_account_form(&Submission::new(), None)
            .await
            .unwrap();
        let user_type = form.field(USER_TYPE).unwrap();
        assert_eq!(user_type.kind, FieldKind::Hidden);
        assert_eq!(user_type.value.as_deref(), Some(NEW_USER));
    }

    #[tokio::test]
    async fn should_reject_existing_username_for_new_user() {
        let svc = SetupService::new(db_store(), StubFactory::with_users(&["alice", "bob"]));
        let outcome = svc
            .submit_admin_account(&new_user("alice"), None)
            .await
            .unwrap();
        let FormOutcome::Invalid(form) = outcome else {
            panic!("expected duplicate username to be rejected");
        };
        assert_eq!(
            form.field(NEW_USER).unwrap().errors,
            vec![DUPLICATE_USERNAME_MESSAGE]
        );
        assert_eq!(svc.store.save_count(), 0);
    }

    #[tokio::test]
    async fn should_create_new_user_and_grant_administrators_role() {
        let users = StubFactory::with_users(&["alice", "bob"]);
        let svc = SetupService::new(db_store(), users.clone());
        let outcome = svc
            .submit_admin_account(&new_user("carol"), None)
            .await
            .unwrap();
        assert!(outcome.is_saved());
        assert_eq!(users.created(), vec![("carol".to_string(), "pw".to_string())]);
        let roles = svc.store.doc(Store::Roles);
        assert_eq!(roles.get(ADMINISTRATORS_ROLE, "users"), Some("carol"));
        assert_eq!(roles.get(ADMINISTRATORS_ROLE, "permissions"), Some("*"));
    }

    #[tokio::test]
    async fn should_name_admin_for_external_backend() {
        let store = MemoryStore::default().with(
            Store::Authentication,
            doc(&[(
                "autologin",
                &[("backend", "external"), ("strip_username_regexp", "@.*$")],
            )]),
        );
        let svc = SetupService::new(store, StubFactory::unreachable());
        let form = svc
            .admin_account_form(&Submission::new(), Some("admin@CORP"))
            .await
            .unwrap();
        assert_eq!(form.field(BY_NAME).unwrap().value.as_deref(), Some("admin"));

        let sub = Submission::new().with(USER_TYPE, BY_NAME).with(BY_NAME, "admin");
        let outcome = svc.submit_admin_account(&sub, None).await.unwrap();
        assert!(outcome.is_saved());
    }

    #[tokio::test]
    async fn should_store_monitoring_backend() {
        let svc = SetupService::new(db_store(), StubFactory::default());
        let form = svc.monitoring_backend_form().await.unwrap();
        assert_eq!(form.field("type").unwrap().options.len(), 2);

        let sub = Submission::new().with(NAME, "icinga").with("type", "ido");
        let outcome = svc.submit_monitoring_backend(&sub).await.unwrap();
        assert!(outcome.is_saved());
        let doc = svc.store.doc(Store::MonitoringBackends);
        assert_eq!(doc.get("icinga", "type"), Some("ido"));
    }
}
