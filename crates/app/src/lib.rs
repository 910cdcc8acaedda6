//! # dashconf-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ConfigStore`: load & save named INI-style configuration documents
//!   - `UserBackend` / `UserBackendFactory`: list, count and create users
//!     of an authentication backend
//!   - `ModuleManager`: list, enable, disable and load modules
//! - Define **driving/inbound ports** as use-case structs:
//!   - `ApplicationService`, `AuthenticationService`, `ResourceService`:
//!     the permission-gated configuration sections
//!   - `ModuleService`, `RoleService`: module management and role lookup
//!   - `SetupService`: the first-run wizard pages
//! - Check permissions, build forms, validate and persist without knowing
//!   *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `dashconf-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
