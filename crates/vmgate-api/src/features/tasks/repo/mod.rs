use crate::shared::error::{ApiError, ApiResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use vmgate_core::{Task, TaskState, TaskStatus};

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Create a queued task and return it with its assigned id
    async fn create(&self, name: String, instance_id: Option<u64>) -> ApiResult<Task>;
    async fn get(&self, id: u64) -> ApiResult<Option<Task>>;
    async fn update(
        &self,
        id: u64,
        state: TaskState,
        status: TaskStatus,
        message: String,
    ) -> ApiResult<Task>;
}

#[derive(Clone)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<HashMap<u64, Task>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, name: String, instance_id: Option<u64>) -> ApiResult<Task> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let task = Task::queued(id, name, instance_id);
        self.tasks.write().await.insert(id, task.clone());
        Ok(task)
    }

    async fn get(&self, id: u64) -> ApiResult<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn update(
        &self,
        id: u64,
        state: TaskState,
        status: TaskStatus,
        message: String,
    ) -> ApiResult<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&id)
            .ok_or_else(|| ApiError::ResourceNotFound(format!("Couldn't find Task with 'id'={}", id)))?;
        task.state = state;
        task.status = status;
        task.message = message;
        task.updated_on = Utc::now();
        Ok(task.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = InMemoryTaskRepository::new();
        let first = repo.create("a".to_string(), None).await.unwrap();
        let second = repo.create("b".to_string(), Some(4)).await.unwrap();
        assert!(second.id > first.id);
        assert_eq!(second.instance_id, Some(4));
    }

    #[tokio::test]
    async fn test_update_changes_state() {
        let repo = InMemoryTaskRepository::new();
        let task = repo.create("a".to_string(), None).await.unwrap();

        let updated = repo
            .update(
                task.id,
                TaskState::Finished,
                TaskStatus::Ok,
                "done".to_string(),
            )
            .await
            .unwrap();

        assert!(updated.is_finished());
        assert_eq!(repo.get(task.id).await.unwrap().unwrap().message, "done");
    }

    #[tokio::test]
    async fn test_update_unknown_task() {
        let repo = InMemoryTaskRepository::new();
        let result = repo
            .update(42, TaskState::Active, TaskStatus::Ok, String::new())
            .await;
        assert!(matches!(result, Err(ApiError::ResourceNotFound(_))));
    }
}
