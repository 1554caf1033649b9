use crate::features::authorization::service::Caller;
use crate::features::tasks::service::TaskService;
use crate::shared::error::{ApiError, ApiResult};
use crate::shared::href::Hrefs;
use crate::shared::types::TaskResource;
use std::sync::Arc;
use tracing::info;

/// Controller for `/api/tasks/:id`; any authenticated caller may poll a task.
pub struct TaskController {
    service: Arc<TaskService>,
    hrefs: Hrefs,
}

impl TaskController {
    pub fn new(service: Arc<TaskService>, hrefs: Hrefs) -> Self {
        Self { service, hrefs }
    }

    pub async fn show(&self, caller: &Caller, id: &str) -> ApiResult<TaskResource> {
        info!(userid = %caller.userid, task_id = %id, "Received show task request");
        let id: u64 = id.trim().parse().map_err(|_| {
            ApiError::ResourceNotFound(format!("Couldn't find Task with 'id'={}", id))
        })?;
        let task = self.service.get(id).await?;
        Ok(TaskResource::new(&task, &self.hrefs))
    }
}
