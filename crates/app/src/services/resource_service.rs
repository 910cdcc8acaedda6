//! Resource service: named connection configurations.

use dashconf_domain::backend::backends_using_resource;
use dashconf_domain::error::{DashConfError, NotFoundError};
use dashconf_domain::form::{FormSpec, Submission};
use dashconf_domain::forms::{self, NAME, submission_from_section};
use dashconf_domain::notification::Notification;
use dashconf_domain::permission::{CONFIG_RESOURCES, PermissionSet};
use dashconf_domain::resource::{self, Resource};

use crate::ports::{ConfigStore, Store};
use crate::services::{FormOutcome, SAVE_FAILED_MESSAGE};

const ENTITY: &str = "Resource";

fn not_found(name: &str) -> NotFoundError {
    NotFoundError {
        entity: ENTITY,
        name: name.to_string(),
    }
}

/// Advisory shown when removing a resource that `backend` authenticates with.
#[must_use]
pub fn removal_warning(resource: &str, backend: &str) -> String {
    format!(
        "The resource \"{resource}\" is currently utilized for authentication by backend \
         \"{backend}\". Removing the resource can result in noone being able to log in any longer."
    )
}

/// Result of removing a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The resource is gone; carries the warnings followed by the success
    /// notification.
    Removed(Vec<Notification>),
    /// Persisting failed; the confirmation must be shown again.
    Invalid(FormSpec),
}

/// Use-cases of the `resource` configuration section.
pub struct ResourceService<S> {
    store: S,
}

impl<S: ConfigStore> ResourceService<S> {
    /// Create a new service backed by the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All resources that parse, in store order.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::Authorization`] without the resources
    /// permission, or a storage error.
    #[tracing::instrument(skip_all)]
    pub async fn list(&self, permissions: &PermissionSet) -> Result<Vec<Resource>, DashConfError> {
        permissions.assert(CONFIG_RESOURCES)?;
        let doc = self.store.load(Store::Resources).await?;
        Ok(resource::parse_all(&doc))
    }

    /// An empty create form, or one re-built for `submission`.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::Authorization`] without the resources
    /// permission.
    pub fn create_form(
        &self,
        permissions: &PermissionSet,
        submission: &Submission,
    ) -> Result<FormSpec, DashConfError> {
        permissions.assert(CONFIG_RESOURCES)?;
        Ok(forms::resource::build(submission))
    }

    /// The edit form pre-filled with resource `name`; secrets are not echoed.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::NotFound`] for an unknown resource.
    pub async fn edit_form(
        &self,
        permissions: &PermissionSet,
        name: &str,
    ) -> Result<FormSpec, DashConfError> {
        permissions.assert(CONFIG_RESOURCES)?;
        let doc = self.store.load(Store::Resources).await?;
        let section = doc.section(name).ok_or_else(|| not_found(name))?;
        Ok(forms::resource::build(&submission_from_section(section)))
    }

    /// Add a new resource.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::Authorization`] without the resources
    /// permission, or a storage error while loading.
    #[tracing::instrument(skip_all)]
    pub async fn create(
        &self,
        permissions: &PermissionSet,
        submission: &Submission,
    ) -> Result<FormOutcome, DashConfError> {
        self.submit(permissions, None, submission).await
    }

    /// Replace resource `name`; blank secrets keep their stored values.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::NotFound`] for an unknown resource (nothing
    /// is saved), or a storage error while loading.
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
        permissions.assert(CONFIG_RESOURCES)?;
        let mut doc = self.store.load(Store::Resources).await?;
        let previous = match editing {
            Some(name) => {
                let section = doc.section(name).ok_or_else(|| not_found(name))?;
                Resource::from_section(section).ok()
            }
            None => None,
        };

        let mut form = forms::resource::build(submission);
        if !form.validate(submission) {
            return Ok(FormOutcome::Invalid(form));
        }
        let resource = match forms::resource::to_resource(&form, submission, previous.as_ref()) {
            Ok(resource) => resource,
            Err(err) => {
                form.add_form_error(err.to_string());
                return Ok(FormOutcome::Invalid(form));
            }
        };
        if editing != Some(resource.name.as_str()) && doc.has_section(&resource.name) {
            form.add_error(NAME, "A resource with this name already exists.");
            return Ok(FormOutcome::Invalid(form));
        }

        let message = match editing {
            Some(old) => {
                doc.replace_section(old, resource.to_section());
                format!("Resource \"{}\" has been successfully updated", resource.name)
            }
            None => {
                doc.set_section(resource.to_section());
                format!("Resource \"{}\" has been successfully created", resource.name)
            }
        };

        if let Err(err) = self.store.save(Store::Resources, &doc).await {
            tracing::error!(error = %err, resource = %resource.name, "failed to save resources");
            form.add_form_error(SAVE_FAILED_MESSAGE);
            return Ok(FormOutcome::Invalid(form));
        }
        tracing::info!(resource = %resource.name, kind = resource.type_name(), "resource saved");
        Ok(FormOutcome::Saved(message))
    }

    /// One advisory per authentication backend that uses resource `name`.
    async fn removal_warnings(&self, name: &str) -> Result<Vec<String>, DashConfError> {
        let backends = self.store.load(Store::Authentication).await?;
        Ok(backends_using_resource(&backends, name)
            .into_iter()
            .map(|backend| removal_warning(name, backend))
            .collect())
    }

    /// The removal confirmation for resource `name`, carrying a warning per
    /// backend that still references it.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::NotFound`] for an unknown resource.
    pub async fn removal_form(
        &self,
        permissions: &PermissionSet,
        name: &str,
    ) -> Result<FormSpec, DashConfError> {
        permissions.assert(CONFIG_RESOURCES)?;
        let doc = self.store.load(Store::Resources).await?;
        if !doc.has_section(name) {
            return Err(not_found(name).into());
        }
        let mut form = forms::confirm_removal();
        for warning in self.removal_warnings(name).await? {
            form.add_warning(warning);
        }
        Ok(form)
    }

    /// Remove resource `name`.
    ///
    /// References from authentication backends do not block the removal;
    /// they are returned as warnings ahead of the success notification.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::NotFound`] for an unknown resource (nothing is
    /// saved), or a storage error while loading. A failed save is reported
    /// as [`RemovalOutcome::Invalid`].
    #[tracing::instrument(skip(self, permissions))]
    pub async fn remove(
        &self,
        permissions: &PermissionSet,
        name: &str,
    ) -> Result<RemovalOutcome, DashConfError> {
        permissions.assert(CONFIG_RESOURCES)?;
        let mut doc = self.store.load(Store::Resources).await?;
        doc.remove_section(name).ok_or_else(|| not_found(name))?;
        let mut notifications: Vec<Notification> = self
            .removal_warnings(name)
            .await?
            .into_iter()
            .map(Notification::warning)
            .collect();
        for warning in &notifications {
            tracing::warn!(
                resource = name,
                warning = %warning.message,
                "removing referenced resource"
            );
        }
        if let Err(err) = self.store.save(Store::Resources, &doc).await {
            tracing::error!(resource = name, error = %err, "failed to remove resource");
            let mut form = forms::confirm_removal();
            for warning in notifications {
                form.add_warning(warning.message);
            }
            form.add_form_error(SAVE_FAILED_MESSAGE);
            return Ok(RemovalOutcome::Invalid(form));
        }
        tracing::info!(resource = name, "resource removed");
        notifications.push(Notification::success(format!(
            "Resource \"{name}\" has been successfully removed"
        )));
        Ok(RemovalOutcome::Removed(notifications))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{MemoryStore, doc, perms};
    use dashconf_domain::document::ConfigDocument;
    use dashconf_domain::forms::resource::{
        DB, DBNAME, HOST, PASSWORD, TYPE, USERNAME,
    };
    use dashconf_domain::notification::Level;
    use dashconf_domain::resource::ResourceKind;

    fn resources() -> ConfigDocument {
        doc(&[
            (
                "web_db",
                &[
                    ("type", "db"),
                    ("db", "mysql"),
                    ("host", "localhost"),
                    ("dbname", "web"),
                    ("username", "web"),
                    ("password", "s3cret"),
                ],
            ),
            ("live", &[("type", "livestatus"), ("socket", "/run/live")]),
        ])
    }

    fn backends() -> ConfigDocument {
        doc(&[
            ("web", &[("backend", "db"), ("resource", "web_db")]),
            ("web_fallback", &[("backend", "db"), ("resource", "web_db")]),
            ("autologin", &[("backend", "external")]),
        ])
    }

    fn service() -> ResourceService<MemoryStore> {
        ResourceService::new(
            MemoryStore::default()
                .with(Store::Resources, resources())
                .with(Store::Authentication, backends()),
        )
    }

    fn allowed() -> PermissionSet {
        perms(&[CONFIG_RESOURCES])
    }

    #[tokio::test]
    async fn should_deny_without_resources_permission() {
        let svc = service();
        let denied = perms(&["system/config/authentication"]);
        assert!(matches!(
            svc.list(&denied).await,
            Err(DashConfError::Authorization(_))
        ));
        assert!(matches!(
            svc.create_form(&denied, &Submission::new()),
            Err(DashConfError::Authorization(_))
        ));
        assert!(matches!(
            svc.remove(&denied, "live").await,
            Err(DashConfError::Authorization(_))
        ));
    }

    #[tokio::test]
    async fn should_warn_once_per_referencing_backend_and_still_remove() {
        let svc = service();
        let outcome = svc.remove(&allowed(), "web_db").await.unwrap();
        let RemovalOutcome::Removed(notes) = outcome else {
            panic!("expected the resource to be removed");
        };
        let warnings: Vec<_> = notes.iter().filter(|n| n.level == Level::Warning).collect();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.contains("backend \"web\""));
        assert!(warnings[1].message.contains("backend \"web_fallback\""));
        assert_eq!(notes.last().unwrap().level, Level::Success);
        assert!(!svc.store.doc(Store::Resources).has_section("web_db"));
    }

    #[tokio::test]
    async fn should_stay_on_confirmation_when_removal_save_fails() {
        let svc = ResourceService::new(
            MemoryStore::default()
                .with(Store::Resources, resources())
                .with(Store::Authentication, backends())
                .failing_saves(),
        );
        let outcome = svc.remove(&allowed(), "web_db").await.unwrap();
        let RemovalOutcome::Invalid(form) = outcome else {
            panic!("expected the confirmation to be shown again");
        };
        assert_eq!(form.errors, vec![SAVE_FAILED_MESSAGE]);
        assert_eq!(form.warnings.len(), 2);
        assert!(svc.store.doc(Store::Resources).has_section("web_db"));
    }

    #[tokio::test]
    async fn should_show_warnings_on_removal_confirmation() {
        let svc = service();
        let form = svc.removal_form(&allowed(), "web_db").await.unwrap();
        assert_eq!(form.warnings.len(), 2);
        let form = svc.removal_form(&allowed(), "live").await.unwrap();
        assert!(form.warnings.is_empty());
    }

    #[tokio::test]
    async fn should_not_save_when_removing_unknown_resource() {
        let svc = service();
        let result = svc.remove(&allowed(), "missing").await;
        let Err(DashConfError::NotFound(err)) = result else {
            panic!("expected not found");
        };
        assert_eq!(err.to_string(), "Resource \"missing\" not found");
        assert_eq!(svc.store.save_count(), 0);
    }

    #[tokio::test]
    async fn should_create_resource() {
        let svc = service();
        let sub = Submission::new()
            .with(NAME, "ido")
            .with(TYPE, "db")
            .with(DB, "pgsql")
            .with(HOST, "db")
            .with(DBNAME, "icinga")
            .with(USERNAME, "icinga");
        let outcome = svc.create(&allowed(), &sub).await.unwrap();
        assert!(outcome.is_saved());
        let list = svc.list(&allowed()).await.unwrap();
        assert_eq!(list.len(), 3);
    }

    #[tokio::test]
    async fn should_keep_password_when_editing_without_one() {
        let svc = service();
        let sub = Submission::new()
            .with(NAME, "web_db")
            .with(TYPE, "db")
            .with(DB, "mysql")
            .with(HOST, "db.internal")
            .with(DBNAME, "web")
            .with(USERNAME, "web")
            .with(PASSWORD, "");
        let outcome = svc.edit(&allowed(), "web_db", &sub).await.unwrap();
        assert!(outcome.is_saved());
        let doc = svc.store.doc(Store::Resources);
        assert_eq!(doc.get("web_db", "password"), Some("s3cret"));
        assert_eq!(doc.get("web_db", "host"), Some("db.internal"));
    }

    #[tokio::test]
    async fn should_not_echo_password_in_edit_form() {
        let svc = service();
        let form = svc.edit_form(&allowed(), "web_db").await.unwrap();
        assert_eq!(form.field(PASSWORD).unwrap().value, None);
        assert_eq!(form.field(HOST).unwrap().value.as_deref(), Some("localhost"));
    }

    #[tokio::test]
    async fn should_reject_rename_onto_existing_resource() {
        let svc = service();
        let sub = Submission::new()
            .with(NAME, "web_db")
            .with(TYPE, "livestatus")
            .with("socket", "/tmp/s");
        let outcome = svc.edit(&allowed(), "live", &sub).await.unwrap();
        assert!(!outcome.is_saved());
        let parsed = resource::parse_all(&svc.store.doc(Store::Resources));
        assert!(matches!(parsed[1].kind, ResourceKind::Livestatus { .. }));
    }
}
