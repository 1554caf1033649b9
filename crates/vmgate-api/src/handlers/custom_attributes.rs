//! Handlers for `/api/instances/:id/custom_attributes`.

use crate::features::authorization::service::Caller;
use crate::features::custom_attributes::controller::CustomAttributeResults;
use crate::server::AppState;
use crate::shared::error::ApiResult;
use crate::shared::types::{ActionRequest, CollectionEnvelope, CustomAttributeResource, ListQuery};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

#[instrument(skip(state, caller, query), fields(instance_id = %id))]
pub async fn list_custom_attributes(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<CollectionEnvelope>> {
    Ok(Json(state.custom_attributes.list(&caller, &id, &query).await?))
}

/// Handler for POST /api/instances/:id/custom_attributes (`add`, `edit`, `delete`)
#[instrument(skip(state, caller, body), fields(instance_id = %id))]
pub async fn act_on_custom_attributes(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<CustomAttributeResults>> {
    let request = ActionRequest::parse(&body)?;
    Ok(Json(state.custom_attributes.act(&caller, &id, request).await?))
}

#[instrument(skip(state, caller), fields(instance_id = %id, attribute_id = %attribute_id))]
pub async fn show_custom_attribute(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path((id, attribute_id)): Path<(String, String)>,
) -> ApiResult<Json<CustomAttributeResource>> {
    Ok(Json(
        state
            .custom_attributes
            .show(&caller, &id, &attribute_id)
            .await?,
    ))
}

/// Handler for DELETE /api/instances/:id/custom_attributes/:ca_id
#[instrument(skip(state, caller), fields(instance_id = %id, attribute_id = %attribute_id))]
pub async fn delete_custom_attribute(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path((id, attribute_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .custom_attributes
        .delete_one(&caller, &id, &attribute_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
