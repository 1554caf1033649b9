use crate::features::tasks::repo::TaskRepository;
use crate::shared::error::{ApiError, ApiResult};
use std::sync::Arc;
use tracing::{debug, info};
use vmgate_core::{Task, TaskState, TaskStatus};

/// Tracks asynchronous work spawned by accepted actions.
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    pub async fn queue(&self, name: impl Into<String>, instance_id: Option<u64>) -> ApiResult<Task> {
        let task = self.repo.create(name.into(), instance_id).await?;
        debug!(task_id = task.id, name = %task.name, "Task queued");
        Ok(task)
    }

    pub async fn mark_active(&self, id: u64) -> ApiResult<Task> {
        self.repo
            .update(id, TaskState::Active, TaskStatus::Ok, "Task running".to_string())
            .await
    }

    pub async fn finish(&self, id: u64, message: impl Into<String>) -> ApiResult<Task> {
        let task = self
            .repo
            .update(id, TaskState::Finished, TaskStatus::Ok, message.into())
            .await?;
        info!(task_id = id, "Task finished");
        Ok(task)
    }

    pub async fn fail(&self, id: u64, message: impl Into<String>) -> ApiResult<Task> {
        let task = self
            .repo
            .update(id, TaskState::Finished, TaskStatus::Error, message.into())
            .await?;
        info!(task_id = id, message = %task.message, "Task failed");
        Ok(task)
    }

    pub async fn get(&self, id: u64) -> ApiResult<Task> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| ApiError::ResourceNotFound(format!("Couldn't find Task with 'id'={}", id)))
    }
}
