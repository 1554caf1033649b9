//! Authentication middleware for `/api` routes.
//!
//! Decodes HTTP Basic credentials, resolves them to a [`Caller`] and stores
//! the caller in request extensions for handlers.

use crate::features::authorization::service::Caller;
use crate::server::AppState;
use crate::shared::error::{ApiError, ApiResult};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Authentication middleware.
///
/// Returns 401 with a `WWW-Authenticate` challenge when credentials are
/// missing, malformed or wrong.
#[instrument(skip_all, name = "vmgate.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (userid, password) = basic_credentials(req.headers())?;
    let caller: Caller = state.authentication.authenticate(&userid, &password).await?;
    debug!(userid = %caller.userid, role = %caller.role, "Caller authenticated");

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// Extract `(userid, password)` from an `Authorization: Basic` header.
pub fn basic_credentials(headers: &HeaderMap) -> ApiResult<(String, String)> {
    let unauthorized = |reason: &str| ApiError::Unauthorized(reason.to_string());

    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let encoded = value
        .strip_prefix("Basic ")
        .ok_or_else(|| unauthorized("Invalid Authorization header format"))?;

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| unauthorized("Invalid Authorization header format"))?;
    let decoded =
        String::from_utf8(decoded).map_err(|_| unauthorized("Invalid Authorization header format"))?;

    let (userid, password) = decoded
        .split_once(':')
        .ok_or_else(|| unauthorized("Invalid Authorization header format"))?;

    Ok((userid.to_string(), password.to_string()))
}
