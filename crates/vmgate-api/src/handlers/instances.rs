//! Handlers for `/api/instances`.

use crate::features::authorization::service::Caller;
use crate::server::AppState;
use crate::shared::error::ApiResult;
use crate::shared::types::{
    ActionRequest, ActionResult, CollectionEnvelope, InstanceResource, ListQuery, ResultsEnvelope,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /api/instances
#[instrument(skip_all)]
pub async fn list_instances(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<CollectionEnvelope>> {
    let listing = state.instances.list_instances(&caller, &query).await?;
    Ok(Json(listing))
}

/// Handler for POST /api/instances
///
/// Runs the action on every referenced instance. Always 200 once the request
/// is authorized; per-instance failures are in the results.
#[instrument(skip_all)]
pub async fn act_on_instances(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    body: Bytes,
) -> ApiResult<Json<ResultsEnvelope<ActionResult>>> {
    let request = ActionRequest::parse(&body)?;
    let results = state.instances.act_on_collection(&caller, request).await?;
    Ok(Json(results))
}

/// Handler for GET /api/instances/:id
#[instrument(skip(state, caller, query), fields(instance_id = %id))]
pub async fn show_instance(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<InstanceResource>> {
    let instance = state.instances.show_instance(&caller, &id, &query).await?;
    Ok(Json(instance))
}

/// Handler for POST /api/instances/:id
#[instrument(skip(state, caller, body), fields(instance_id = %id))]
pub async fn act_on_instance(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<ActionResult>> {
    let request = ActionRequest::parse(&body)?;
    let result = state.instances.act_on_instance(&caller, &id, request).await?;
    Ok(Json(result))
}
