//! Module service: listing and (de)activating modules.

use dashconf_domain::error::{DashConfError, NotFoundError};
use dashconf_domain::module::{self, Module};
use dashconf_domain::permission::{CONFIG_MODULES, PermissionSet};

use crate::ports::ModuleManager;

/// Use-cases of the modules tab.
pub struct ModuleService<M> {
    modules: M,
}

fn not_found(name: &str) -> NotFoundError {
    NotFoundError {
        entity: "Module",
        name: name.to_string(),
    }
}

impl<M: ModuleManager> ModuleService<M> {
    /// Create a new service backed by the given module manager.
    pub fn new(modules: M) -> Self {
        Self { modules }
    }

    /// Installed modules, enabled first then by name.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::Authorization`] without the modules
    /// permission, or the manager's error.
    #[tracing::instrument(skip_all)]
    pub async fn list(&self, permissions: &PermissionSet) -> Result<Vec<Module>, DashConfError> {
        permissions.assert(CONFIG_MODULES)?;
        let mut modules = self.modules.list().await?;
        module::sort_for_listing(&mut modules);
        Ok(modules)
    }

    /// The installed module called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::Validation`] for a malformed name and
    /// [`DashConfError::NotFound`] when it is not installed.
    pub async fn detail(
        &self,
        permissions: &PermissionSet,
        name: &str,
    ) -> Result<Module, DashConfError> {
        permissions.assert(CONFIG_MODULES)?;
        module::validate_name(name)?;
        self.modules
            .get(name)
            .await?
            .ok_or_else(|| not_found(name).into())
    }

    /// Enable and immediately load module `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::NotFound`] for an unknown module and
    /// [`DashConfError::Module`] when the manager refuses.
    #[tracing::instrument(skip(self, permissions))]
    pub async fn enable(
        &self,
        permissions: &PermissionSet,
        name: &str,
    ) -> Result<String, DashConfError> {
        permissions.assert(CONFIG_MODULES)?;
        module::validate_name(name)?;
        if !self.modules.has_installed(name).await? {
            return Err(not_found(name).into());
        }
        self.modules.enable(name).await?;
        self.modules.load(name).await?;
        tracing::info!(module = name, "module enabled");
        Ok(format!("Module \"{name}\" enabled"))
    }

    /// Disable module `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DashConfError::NotFound`] for an unknown module and
    /// [`DashConfError::Module`] when the manager refuses.
    #[tracing::instrument(skip(self, permissions))]
    pub async fn disable(
        &self,
        permissions: &PermissionSet,
        name: &str,
    ) -> Result<String, DashConfError> {
        permissions.assert(CONFIG_MODULES)?;
        module::validate_name(name)?;
        if !self.modules.has_installed(name).await? {
            return Err(not_found(name).into());
        }
        self.modules.disable(name).await?;
        tracing::info!(module = name, "module disabled");
        Ok(format!("Module \"{name}\" disabled"))
    }
}
