//! Per-route request metrics.

use crate::server::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

/// Records request count and latency, labelled by route template so ids do
/// not blow up label cardinality.
pub async fn track_requests(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let started = Instant::now();

    let response = next.run(req).await;

    state.observability.record_api_request(
        &endpoint,
        response.status().as_str(),
        started.elapsed().as_secs_f64(),
    );
    response
}
