//! Authentication service: the chain of authentication backends.

use dashconf_domain::backend::AuthBackend;
use dashconf_domain::document::ConfigDocument;
use dashconf_domain::error::{DashConfError, NotFoundError};
use dashconf_domain::form::{FormSpec, Submission};
use dashconf_domain::forms::{self, NAME, auth_backend, submission_from_section};
use dashconf_domain::permission::{CONFIG_AUTHENTICATION, PermissionSet};
use dashconf_domain::resource::{self, Resource};

use crate::ports::{ConfigStore, Store, UserBackendFactory};
use crate::services::{FormOutcome, SAVE_FAILED_MESSAGE, users};

const ENTITY: &str = "Authentication backend";

/// Direction of a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
}

/// Use-cases of the `authentication` configuration section.
pub struct AuthenticationService<S, F> {
    store: S,
    users: F,
}

fn not_found(name: &str) -> NotFoundError {
    NotFoundError {
        entity: ENTITY,
        name: name.to_string(),
    }
}

impl<S: ConfigStore, F: UserBackendFactory> AuthenticationService<S, F> {
    /// Create a new service backed by the given store and user backends.
    pub fn new(store: S, users: F) -> Self {
        Self { store, users }
    }

    async fn resources(&self) -> Result<(ConfigDocument, Vec<Resource>), DashConfError> {
        let doc = self.store.load(Store::Resources).await?;
        let parsed = resource::parse_all(&doc);
        Ok((doc, parsed))
    }

    /// The configured backends in chain order.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::Authorization`] without the authentication
    /// permission, or a storage error.
    #[tracing::instrument(skip_all)]
    pub async fn list(
        &self,
        permissions: &PermissionSet,
    ) -> Result<Vec<AuthBackend>, DashConfError> {
        permissions.assert(CONFIG_AUTHENTICATION)?;
        let doc = self.store.load(Store::Authentication).await?;
        Ok(doc
            .sections()
            .filter_map(|section| match AuthBackend::from_section(section) {
                Ok(backend) => Some(backend),
                Err(err) => {
                    tracing::warn!(
                        backend = section.name(),
                        error = %err,
                        "skipping invalid backend"
                    );
                    None
                }
            })
            .collect())
    }

    /// Move backend `name` one position up or down in the chain.
    ///
    /// Moving past either end leaves the order unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::NotFound`] for an unknown backend (nothing is
    /// saved), or a storage error.
    #[tracing::instrument(skip(self, permissions))]
    pub async fn reorder(
        &self,
        permissions: &PermissionSet,
        name: &str,
        direction: Move,
    ) -> Result<String, DashConfError> {
        permissions.assert(CONFIG_AUTHENTICATION)?;
        let mut doc = self.store.load(Store::Authentication).await?;
        let position = doc.position(name).ok_or_else(|| not_found(name))?;
        let target = match direction {
            Move::Up => position.saturating_sub(1),
            Move::Down => (position + 1).min(doc.len() - 1),
        };
        if target != position {
            doc.move_section(name, target);
            self.store.save(Store::Authentication, &doc).await?;
            tracing::info!(backend = name, position = target, "authentication order updated");
        }
        Ok("Authentication order updated".to_string())
    }

    /// An empty create form, or one re-built for `submission`.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::Authorization`] without the authentication
    /// permission, or a storage error.
    pub async fn create_form(
        &self,
        permissions: &PermissionSet,
        submission: &Submission,
    ) -> Result<FormSpec, DashConfError> {
        permissions.assert(CONFIG_AUTHENTICATION)?;
        let (_, resources) = self.resources().await?;
        Ok(auth_backend::build(submission, &resources, false))
    }

    /// The edit form pre-filled with backend `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::NotFound`] for an unknown backend.
    pub async fn edit_form(
        &self,
        permissions: &PermissionSet,
        name: &str,
    ) -> Result<FormSpec, DashConfError> {
        permissions.assert(CONFIG_AUTHENTICATION)?;
        let doc = self.store.load(Store::Authentication).await?;
        let section = doc.section(name).ok_or_else(|| not_found(name))?;
        let (_, resources) = self.resources().await?;
        Ok(auth_backend::build(
            &submission_from_section(section),
            &resources,
            false,
        ))
    }

    /// Add a new backend at the end of the chain.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::Authorization`] without the authentication
    /// permission, or a storage error while loading.
    #[tracing::instrument(skip_all)]
    pub async fn create(
        &self,
        permissions: &PermissionSet,
        submission: &Submission,
    ) -> Result<FormOutcome, DashConfError> {
        self.submit(permissions, None, submission).await
    }

    /// Replace backend `name`, possibly renaming it in place.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::NotFound`] for an unknown backend (nothing is
    /// saved), or a storage error while loading.
    #[tracing::instrument(skip(self, permissions, submission))]
    pub async fn edit(
        &self,
        permissions: &PermissionSet,
        name: &str,
        submission: &Submission,
    ) -> Result<FormOutcome, DashConfError> {
        self.submit(permissions, Some(name), submission).await
    }

    async fn submit(
        &self,
        permissions: &PermissionSet,
        editing: Option<&str>,
        submission: &Submission,
    ) -> Result<FormOutcome, DashConfError> {
        permissions.assert(CONFIG_AUTHENTICATION)?;
        let mut doc = self.store.load(Store::Authentication).await?;
        if let Some(name) = editing
            && !doc.has_section(name)
        {
            return Err(not_found(name).into());
        }

        let (resources_doc, resources) = self.resources().await?;
        let skip = auth_backend::skip_validation(submission);
        let mut form = auth_backend::build(submission, &resources, skip);
        if !form.validate(submission) {
            return Ok(FormOutcome::Invalid(form));
        }
        let backend = match auth_backend::to_backend(&form, submission) {
            Ok(backend) => backend,
            Err(err) => {
                form.add_form_error(err.to_string());
                return Ok(FormOutcome::Invalid(form));
            }
        };

        if editing != Some(backend.name.as_str()) && doc.has_section(&backend.name) {
            form.add_error(NAME, "A backend with this name already exists.");
            return Ok(FormOutcome::Invalid(form));
        }

        if !skip && auth_backend::requires_user_check(&backend) {
            let problem = match users::count(&self.users, &backend, &resources_doc).await {
                Ok(0) => Some(format!(
                    "No users found under the specified {} backend",
                    backend.kind.label()
                )),
                Ok(_) => None,
                Err(err) => Some(format!(
                    "Unable to validate authentication using the {} backend: {err}",
                    backend.kind.label()
                )),
            };
            if let Some(problem) = problem {
                let mut form = auth_backend::build(submission, &resources, true);
                form.populate(submission);
                form.add_form_error(problem);
                return Ok(FormOutcome::Invalid(form));
            }
        }

        let message = match editing {
            Some(old) => {
                doc.replace_section(old, backend.to_section());
                format!("Authentication backend \"{}\" has been successfully updated", backend.name)
            }
            None => {
                doc.set_section(backend.to_section());
                format!("Authentication backend \"{}\" has been successfully created", backend.name)
            }
        };

        if let Err(err) = self.store.save(Store::Authentication, &doc).await {
            tracing::error!(
                error = %err,
                backend = %backend.name,
                "failed to save authentication backends"
            );
            form.add_form_error(SAVE_FAILED_MESSAGE);
            return Ok(FormOutcome::Invalid(form));
        }
        tracing::info!(
            backend = %backend.name,
            kind = backend.type_name(),
            "authentication backend saved"
        );
        Ok(FormOutcome::Saved(message))
    }

    /// Remove backend `name` from the chain.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::NotFound`] for an unknown backend (nothing is
    /// saved), or a storage error while loading. A failed save re-renders
    /// the confirmation.
    #[tracing::instrument(skip(self, permissions))]
    pub async fn remove(
        &self,
        permissions: &PermissionSet,
        name: &str,
    ) -> Result<FormOutcome, DashConfError> {
        permissions.assert(CONFIG_AUTHENTICATION)?;
        let mut doc = self.store.load(Store::Authentication).await?;
        doc.remove_section(name).ok_or_else(|| not_found(name))?;
        if let Err(err) = self.store.save(Store::Authentication, &doc).await {
            tracing::error!(
                backend = name,
                error = %err,
                "failed to remove authentication backend"
            );
            let mut form = forms::confirm_removal();
            form.add_form_error(SAVE_FAILED_MESSAGE);
            return Ok(FormOutcome::Invalid(form));
        }
        tracing::info!(backend = name, "authentication backend removed");
        Ok(FormOutcome::Saved(format!(
            "Authentication backend \"{name}\" has been successfully removed"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{MemoryStore, StubFactory, doc, perms};
    use dashconf_domain::forms::auth_backend::{BACKEND, RESOURCE, SKIP_VALIDATION};

    fn resources() -> ConfigDocument {
        doc(&[(
            "web_db",
            &[("type", "db"), ("db", "sqlite"), ("dbname", "/tmp/web.db")],
        )])
    }

    fn backends() -> ConfigDocument {
        doc(&[
            ("autologin", &[("backend", "external")]),
            ("web", &[("backend", "db"), ("resource", "web_db")]),
        ])
    }

    fn service(users: StubFactory) -> AuthenticationService<MemoryStore, StubFactory> {
        AuthenticationService::new(
            MemoryStore::default()
                .with(Store::Resources, resources())
                .with(Store::Authentication, backends()),
            users,
        )
    }

    fn allowed() -> PermissionSet {
        perms(&[CONFIG_AUTHENTICATION])
    }

    fn db_submission(name: &str) -> Submission {
        Submission::new()
            .with(NAME, name)
            .with(BACKEND, "db")
            .with(RESOURCE, "web_db")
    }

    #[tokio::test]
    async fn should_deny_without_authentication_permission() {
        let svc = service(StubFactory::with_users(&["a"]));
        let denied = perms(&["system/config/application"]);
        assert!(matches!(
            svc.list(&denied).await,
            Err(DashConfError::Authorization(_))
        ));
        assert!(matches!(
            svc.remove(&denied, "web").await,
            Err(DashConfError::Authorization(_))
        ));
        assert_eq!(svc.store.save_count(), 0);
    }

    #[tokio::test]
    async fn should_list_backends_in_chain_order() {
        let svc = service(StubFactory::default());
        let names: Vec<_> = svc
            .list(&allowed())
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["autologin", "web"]);
    }

    #[tokio::test]
    async fn should_move_backend_up() {
        let svc = service(StubFactory::default());
        svc.reorder(&allowed(), "web", Move::Up).await.unwrap();
        let order: Vec<_> = svc
            .store
            .doc(Store::Authentication)
            .section_names()
            .map(str::to_string)
            .collect();
        assert_eq!(order, vec!["web", "autologin"]);
    }

    #[tokio::test]
    async fn should_not_save_when_moving_past_the_end() {
        let svc = service(StubFactory::default());
        svc.reorder(&allowed(), "web", Move::Down).await.unwrap();
        assert_eq!(svc.store.save_count(), 0);
    }

    #[tokio::test]
    async fn should_create_db_backend_with_users() {
        let svc = service(StubFactory::with_users(&["alice"]));
        let outcome = svc.create(&allowed(), &db_submission("second")).await.unwrap();
        assert_eq!(
            outcome,
            FormOutcome::Saved(
                "Authentication backend \"second\" has been successfully created".to_string()
            )
        );
        let doc = svc.store.doc(Store::Authentication);
        assert_eq!(doc.position("second"), Some(2));
    }

    #[tokio::test]
    async fn should_reject_duplicate_backend_name() {
        let svc = service(StubFactory::with_users(&["alice"]));
        let outcome = svc.create(&allowed(), &db_submission("web")).await.unwrap();
        let FormOutcome::Invalid(form) = outcome else {
            panic!("expected duplicate name to be rejected");
        };
        assert!(form.field(NAME).unwrap().has_errors());
        assert_eq!(svc.store.save_count(), 0);
    }

    #[tokio::test]
    async fn should_offer_skip_validation_when_backend_has_no_users() {
        let svc = service(StubFactory::with_users(&[]));
        let outcome = svc.create(&allowed(), &db_submission("empty")).await.unwrap();
        let FormOutcome::Invalid(form) = outcome else {
            panic!("expected validation failure");
        };
        assert!(form.has_field(SKIP_VALIDATION));
        assert_eq!(
            form.errors,
            vec!["No users found under the specified database backend"]
        );

        let outcome = svc
            .create(&allowed(), &db_submission("empty").with(SKIP_VALIDATION, "1"))
            .await
            .unwrap();
        assert!(outcome.is_saved());
    }

    #[tokio::test]
    async fn should_report_unreachable_backend_on_form() {
        let svc = service(StubFactory::unreachable());
        let outcome = svc.create(&allowed(), &db_submission("down")).await.unwrap();
        let FormOutcome::Invalid(form) = outcome else {
            panic!("expected validation failure");
        };
        assert!(form.errors[0].starts_with("Unable to validate authentication"));
    }

    #[tokio::test]
    async fn should_rename_backend_in_place() {
        let svc = service(StubFactory::with_users(&["alice"]));
        let outcome = svc
            .edit(&allowed(), "web", &db_submission("web_users"))
            .await
            .unwrap();
        assert!(outcome.is_saved());
        let doc = svc.store.doc(Store::Authentication);
        assert_eq!(doc.position("web_users"), Some(1));
        assert!(!doc.has_section("web"));
    }

    #[tokio::test]
    async fn should_fail_edit_of_unknown_backend_without_saving() {
        let svc = service(StubFactory::with_users(&["alice"]));
        let result = svc.edit(&allowed(), "nope", &db_submission("nope")).await;
        assert!(matches!(result, Err(DashConfError::NotFound(_))));
        assert!(matches!(
            svc.edit_form(&allowed(), "nope").await,
            Err(DashConfError::NotFound(_))
        ));
        assert_eq!(svc.store.save_count(), 0);
    }

    #[tokio::test]
    async fn should_remove_backend() {
        let svc = service(StubFactory::default());
        let outcome = svc.remove(&allowed(), "autologin").await.unwrap();
        assert_eq!(
            outcome,
            FormOutcome::Saved(
                "Authentication backend \"autologin\" has been successfully removed".to_string()
            )
        );
        assert!(!svc.store.doc(Store::Authentication).has_section("autologin"));

        let result = svc.remove(&allowed(), "autologin").await;
        assert!(matches!(result, Err(DashConfError::NotFound(_))));
        assert_eq!(svc.store.save_count(), 1);
    }

    #[tokio::test]
    async fn should_stay_on_confirmation_when_backend_removal_save_fails() {
        let svc = AuthenticationService::new(
            MemoryStore::default()
                .with(Store::Authentication, backends())
                .failing_saves(),
            StubFactory::default(),
        );
        let outcome = svc.remove(&allowed(), "autologin").await.unwrap();
        let FormOutcome::Invalid(form) = outcome else {
            panic!("expected the confirmation to be shown again");
        };
        assert_eq!(form.errors, vec![SAVE_FAILED_MESSAGE]);
        assert!(svc.store.doc(Store::Authentication).has_section("autologin"));
    }
}
