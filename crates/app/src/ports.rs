//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod config_store;
pub mod module_manager;
pub mod user_backend;

pub use config_store::{ConfigStore, Store};
pub use module_manager::ModuleManager;
pub use user_backend::{UserBackend, UserBackendFactory};
