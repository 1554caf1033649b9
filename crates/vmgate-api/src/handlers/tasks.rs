use crate::features::authorization::service::Caller;
use crate::server::AppState;
use crate::shared::error::ApiResult;
use crate::shared::types::TaskResource;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /api/tasks/:id
#[instrument(skip(state, caller), fields(task_id = %id))]
pub async fn show_task(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskResource>> {
    Ok(Json(state.tasks.show(&caller, &id).await?))
}
