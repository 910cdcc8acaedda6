//! Module manager port: installed modules and their activation state.

use std::future::Future;

use dashconf_domain::error::DashConfError;
use dashconf_domain::module::Module;

/// Discovers, enables and disables modules.
///
/// Failures of enable/disable/load are reported as
/// [`DashConfError::Module`] carrying a message fit for display.
pub trait ModuleManager {
    /// All installed modules.
    fn list(&self) -> impl Future<Output = Result<Vec<Module>, DashConfError>> + Send;

    /// Whether a module called `name` is installed.
    fn has_installed(&self, name: &str) -> impl Future<Output = Result<bool, DashConfError>> + Send;

    /// The installed module called `name`.
    fn get(&self, name: &str) -> impl Future<Output = Result<Option<Module>, DashConfError>> + Send;

    /// Mark `name` as enabled. Enabling an enabled module is a no-op.
    fn enable(&self, name: &str) -> impl Future<Output = Result<(), DashConfError>> + Send;

    /// Mark `name` as disabled. Disabling a disabled module is a no-op.
    fn disable(&self, name: &str) -> impl Future<Output = Result<(), DashConfError>> + Send;

    /// Load an enabled module so it takes effect immediately.
    fn load(&self, name: &str) -> impl Future<Output = Result<(), DashConfError>> + Send;
}
