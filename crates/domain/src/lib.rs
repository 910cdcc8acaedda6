//! # dashconf-domain
//!
//! Pure domain model for the dashconf configuration front-end.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, permission tokens, identities
//! - Resolve which configuration **Sections** a permission set may reach
//! - Model INI-style **Configuration documents** (ordered named sections)
//! - Define **Authentication backends**, **Resources**, **Roles** and **Modules**
//! - Declarative **Forms**: field descriptors, validation, and the concrete
//!   builders for every configuration and setup page
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod permission;

pub mod backend;
pub mod document;
pub mod form;
pub mod forms;
pub mod module;
pub mod notification;
pub mod resource;
pub mod role;
pub mod section;
pub mod tabs;
