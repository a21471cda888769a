//! HTTP layer: one router per service plus the gateway forwarder.

pub mod auth;
pub mod gateway;
pub mod orders;
pub mod products;
pub mod routes;

use axum::extract::FromRequest;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;

/// `Json` extractor whose rejections render as a 400 `{message}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ValidJson<T>(pub T);

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Parse a path id. A malformed id cannot name a stored entity, so it is
/// reported the same way as an unknown one.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    raw.parse::<Uuid>().map_err(|_| ApiError::not_found(not_found))
}

/// Treat absent and blank strings alike.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Passwords are taken verbatim; only an empty one counts as missing.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
