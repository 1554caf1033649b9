//! Prometheus metrics endpoint.
//!
//! Unauthenticated so Prometheus can scrape it. Labels are route templates
//! and action names only.

use crate::server::AppState;
use crate::shared::error::ApiError;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Handler for GET /metrics
#[tracing::instrument(skip_all, name = "vmgate.metrics.scrape")]
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let body = state
        .observability
        .render_metrics()
        .map_err(ApiError::StorageError)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}
