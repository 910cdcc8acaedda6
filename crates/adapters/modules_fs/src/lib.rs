//! # dashconf-adapter-modules-fs
//!
//! Module manager working on plain directories.
//!
//! ## Responsibilities
//! - Implement the `ModuleManager` port defined in `dashconf-app::ports`
//! - Discover modules as sub-directories of the configured search path,
//!   reading optional metadata from `module.info`
//! - Record enabled modules as links in the enabled-modules directory
//!
//! ## Dependency rule
//! Depends on `dashconf-app` (for port traits) and `dashconf-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod manager;

pub use error::ModuleFsError;
pub use manager::FsModuleManager;
