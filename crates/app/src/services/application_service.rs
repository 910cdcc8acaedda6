//! Application service: the general settings section.

use dashconf_domain::error::DashConfError;
use dashconf_domain::form::{FormSpec, Submission};
use dashconf_domain::forms::application;
use dashconf_domain::permission::{CONFIG_APPLICATION, PermissionSet};
use dashconf_domain::resource;

use crate::ports::{ConfigStore, Store};
use crate::services::{FormOutcome, SAVE_FAILED_MESSAGE};

/// Use-cases of the `application` configuration section.
pub struct ApplicationService<S> {
    store: S,
}

impl<S: ConfigStore> ApplicationService<S> {
    /// Create a new service backed by the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn db_resources(&self) -> Result<Vec<String>, DashConfError> {
        let resources = self.store.load(Store::Resources).await?;
        Ok(resource::names_of_type(&resources, "db"))
    }

    /// The settings form filled with the stored values.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::Authorization`] without the application
    /// permission, or a storage error.
    #[tracing::instrument(skip(self, permissions))]
    pub async fn form(&self, permissions: &PermissionSet) -> Result<FormSpec, DashConfError> {
        permissions.assert(CONFIG_APPLICATION)?;
        let config = self.store.load(Store::Config).await?;
        Ok(application::build(
            &application::from_document(&config),
            &self.db_resources().await?,
        ))
    }

    /// Validate and persist the submitted settings.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::Authorization`] without the application
    /// permission, or a storage error while loading.
    #[tracing::instrument(skip_all)]
    pub async fn submit(
        &self,
        permissions: &PermissionSet,
        submission: &Submission,
    ) -> Result<FormOutcome, DashConfError> {
        permissions.assert(CONFIG_APPLICATION)?;
        let mut form = application::build(submission, &self.db_resources().await?);
        if !form.validate(submission) {
            return Ok(FormOutcome::Invalid(form));
        }

        let mut config = self.store.load(Store::Config).await?;
        application::apply(&mut config, &form, submission);
        if let Err(err) = self.store.save(Store::Config, &config).await {
            tracing::error!(error = %err, "failed to save application configuration");
            form.add_form_error(SAVE_FAILED_MESSAGE);
            return Ok(FormOutcome::Invalid(form));
        }

        tracing::info!("application configuration updated");
        Ok(FormOutcome::Saved(
            "New configuration has successfully been stored".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{MemoryStore, perms};
    use dashconf_domain::forms::application::{
        GLOBAL_MODULE_PATH, LOGGING_APPLICATION, LOGGING_LEVEL, LOGGING_LOG, PREFERENCES_TYPE,
    };

    fn valid() -> Submission {
        Submission::new()
            .with(GLOBAL_MODULE_PATH, "/srv/modules")
            .with(PREFERENCES_TYPE, "ini")
            .with(LOGGING_LOG, "syslog")
            .with(LOGGING_LEVEL, "WARNING")
            .with(LOGGING_APPLICATION, "dash")
    }

    #[tokio::test]
    async fn should_deny_without_application_permission() {
        let svc = ApplicationService::new(MemoryStore::default());
        let result = svc.form(&perms(&["system/config/resources"])).await;
        assert!(matches!(result, Err(DashConfError::Authorization(_))));
        let result = svc.submit(&PermissionSet::new(), &valid()).await;
        assert!(matches!(result, Err(DashConfError::Authorization(_))));
    }

    #[tokio::test]
    async fn should_persist_valid_submission() {
        let svc = ApplicationService::new(MemoryStore::default());
        let outcome = svc
            .submit(&perms(&[CONFIG_APPLICATION]), &valid())
            .await
            .unwrap();
        assert!(outcome.is_saved());
        let config = svc.store.doc(Store::Config);
        assert_eq!(config.get("logging", "level"), Some("WARNING"));
        assert_eq!(config.get("global", "module_path"), Some("/srv/modules"));
    }

    #[tokio::test]
    async fn should_not_persist_invalid_submission() {
        let svc = ApplicationService::new(MemoryStore::default());
        let outcome = svc
            .submit(
                &perms(&[CONFIG_APPLICATION]),
                &valid().with(LOGGING_LEVEL, "TRACE"),
            )
            .await
            .unwrap();
        let FormOutcome::Invalid(form) = outcome else {
            panic!("expected invalid form");
        };
        assert!(form.field(LOGGING_LEVEL).unwrap().has_errors());
        assert_eq!(svc.store.save_count(), 0);
    }

    #[tokio::test]
    async fn should_stay_on_form_when_save_fails() {
        let svc = ApplicationService::new(MemoryStore::default().failing_saves());
        let outcome = svc
            .submit(&perms(&[CONFIG_APPLICATION]), &valid())
            .await
            .unwrap();
        let FormOutcome::Invalid(form) = outcome else {
            panic!("expected form to be shown again");
        };
        assert_eq!(form.errors, vec![SAVE_FAILED_MESSAGE]);
    }

    #[tokio::test]
    async fn should_prefill_form_from_store() {
        let mut config = dashconf_domain::document::ConfigDocument::new();
        config.set("logging", "log", "file");
        config.set("logging", "file", "/tmp/x.log");
        let svc = ApplicationService::new(MemoryStore::default().with(Store::Config, config));
        let form = svc.form(&perms(&["*"])).await.unwrap();
        assert_eq!(
            form.field("logging_file").unwrap().value.as_deref(),
            Some("/tmp/x.log")
        );
    }
}
