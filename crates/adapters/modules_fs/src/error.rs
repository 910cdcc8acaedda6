//! Module-manager error type; every variant is shown to the user verbatim.

use dashconf_domain::error::{DashConfError, ModuleError};

/// Errors originating from the filesystem module manager.
#[derive(Debug, thiserror::Error)]
pub enum ModuleFsError {
    /// A filesystem operation failed.
    #[error("Cannot {action} module \"{module}\": {source}")]
    Io {
        action: &'static str,
        module: String,
        #[source]
        source: std::io::Error,
    },

    /// No installed module carries this name.
    #[error("Module \"{0}\" is not installed")]
    NotInstalled(String),

    /// Loading requires the module to be enabled first.
    #[error("Cannot load module \"{0}\" as it is not enabled")]
    NotEnabled(String),
}

impl ModuleFsError {
    fn module(&self) -> &str {
        match self {
            Self::Io { module, .. } => module,
            Self::NotInstalled(module) | Self::NotEnabled(module) => module,
        }
    }
}

impl From<ModuleFsError> for DashConfError {
    fn from(err: ModuleFsError) -> Self {
        Self::Module(ModuleError::new(err.module(), err.to_string()))
    }
}
