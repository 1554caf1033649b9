//! Handlers for `/api/instances/:id/load_balancers`.

use crate::features::authorization::service::Caller;
use crate::server::AppState;
use crate::shared::error::ApiResult;
use crate::shared::types::{CollectionEnvelope, ListQuery, LoadBalancerResource};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

#[instrument(skip(state, caller, query), fields(instance_id = %id))]
pub async fn list_load_balancers(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<CollectionEnvelope>> {
    Ok(Json(state.load_balancers.list(&caller, &id, &query).await?))
}

#[instrument(skip(state, caller), fields(instance_id = %id, load_balancer_id = %lb_id))]
pub async fn show_load_balancer(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path((id, lb_id)): Path<(String, String)>,
) -> ApiResult<Json<LoadBalancerResource>> {
    Ok(Json(state.load_balancers.show(&caller, &id, &lb_id).await?))
}
