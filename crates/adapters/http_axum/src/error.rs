//! HTTP error response mapping.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use dashconf_domain::error::DashConfError;

use crate::pages::render;

/// Standalone error page; it carries no tabs since the caller may hold no
/// permission at all.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: &'static str,
    pub message: String,
}

/// Maps [`DashConfError`] to an HTML error page with the matching status.
#[derive(Debug)]
pub struct PageError(pub DashConfError);

impl From<DashConfError> for PageError {
    fn from(err: DashConfError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, title, message) = match &self.0 {
            DashConfError::Authorization(err) => {
                tracing::warn!(error = %err, "access denied");
                (StatusCode::FORBIDDEN, "Access denied", err.to_string())
            }
            DashConfError::NotFound(err) => (StatusCode::NOT_FOUND, "Not found", err.to_string()),
            DashConfError::Validation(err) => {
                (StatusCode::BAD_REQUEST, "Invalid request", err.to_string())
            }
            DashConfError::Module(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Module error",
                err.to_string(),
            ),
            DashConfError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error",
                    "internal server error".to_string(),
                )
            }
        };

        let mut response = render(&ErrorTemplate { title, message }, false);
        *response.status_mut() = status;
        response
    }
}
