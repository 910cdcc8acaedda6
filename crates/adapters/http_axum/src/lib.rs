//! # dashconf-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **configuration pages** (`/config/...`, `/roles`) and the
//!   **setup wizard** (`/setup/...`) as server-side rendered HTML
//! - Resolve the caller's identity from the remote-user header and pass its
//!   permissions into every service call
//! - Map application results into HTML responses or redirects
//!
//! ## No-JS approach
//! - Every page is rendered server-side as complete HTML with askama.
//! - Forms POST back to the same URL. A saved form redirects (PRG pattern)
//!   and its notification travels in a flash cookie; an invalid form is
//!   re-rendered in place with its field errors.
//!
//! ## Dependency rule
//! Depends on `dashconf-app` (for port traits and services) and
//! `dashconf-domain` (for forms, tabs and notifications). Never leaks axum
//! types into the domain.

pub mod error;
pub mod flash;
pub mod identity;
pub mod pages;
pub mod router;
pub mod state;
