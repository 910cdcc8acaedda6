//! Notifications carried across a redirect in a short-lived cookie.
//!
//! The cookie value is the JSON list of notifications, base64 encoded
//! (URL-safe alphabet, no padding) so it stays a valid cookie token.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use dashconf_domain::notification::Notification;

pub const COOKIE_NAME: &str = "dashconf_flash";

/// `Set-Cookie` value expiring the flash cookie.
pub const CLEAR_COOKIE: &str = "dashconf_flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

/// Notifications queued by the previous request.
#[derive(Debug, Default)]
pub struct Flash(pub Vec<Notification>);

impl Flash {
    #[must_use]
    pub fn into_inner(self) -> Vec<Notification> {
        self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Flash {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(read(&parts.headers)))
    }
}

fn cookie_value(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name == COOKIE_NAME && !value.is_empty()).then_some(value)
        })
}

/// Decode the notifications from the request cookies; a malformed cookie
/// yields nothing.
#[must_use]
pub fn read(headers: &HeaderMap) -> Vec<Notification> {
    let Some(value) = cookie_value(headers) else {
        return Vec::new();
    };
    let decoded = match URL_SAFE_NO_PAD.decode(value) {
        Ok(decoded) => decoded,
        Err(err) => {
            tracing::warn!(error = %err, "discarding undecodable flash cookie");
            return Vec::new();
        }
    };
    serde_json::from_slice(&decoded).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "discarding malformed flash cookie");
        Vec::new()
    })
}

fn encode(notifications: &[Notification]) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(notifications)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Redirect to `to` (303 See Other), queueing `notifications` for the next
/// rendered page.
#[must_use]
pub fn redirect(to: &str, notifications: &[Notification]) -> Response {
    if notifications.is_empty() {
        return Redirect::to(to).into_response();
    }
    match encode(notifications) {
        Ok(value) => (
            AppendHeaders([(
                header::SET_COOKIE,
                format!("{COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax"),
            )]),
            Redirect::to(to),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode flash notifications");
            Redirect::to(to).into_response()
        }
    }
}
