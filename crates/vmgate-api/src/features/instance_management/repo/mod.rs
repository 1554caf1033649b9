use crate::shared::error::{ApiError, ApiResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use vmgate_core::Instance;

/// Repository trait for instance storage
#[async_trait]
pub trait InstanceRepository: Send + Sync {
    /// Store or replace an instance
    async fn upsert(&self, instance: Instance) -> ApiResult<()>;

    /// Retrieve an instance by ID
    async fn get(&self, id: u64) -> ApiResult<Option<Instance>>;

    /// List all VMs, cloud and infra, ordered by id
    async fn list(&self) -> ApiResult<Vec<Instance>>;

    /// Record a new raw power state reported by the backend
    async fn update_power_state(&self, id: u64, raw_power_state: &str) -> ApiResult<()>;
}

/// In-memory implementation of instance repository
#[derive(Clone, Default)]
pub struct InMemoryInstanceRepository {
    storage: Arc<RwLock<BTreeMap<u64, Instance>>>,
}

impl InMemoryInstanceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> ApiError {
    ApiError::StorageError("Lock poisoned".to_string())
}

#[async_trait]
impl InstanceRepository for InMemoryInstanceRepository {
    async fn upsert(&self, instance: Instance) -> ApiResult<()> {
        let mut storage = self.storage.write().map_err(|_| poisoned())?;
        storage.insert(instance.id, instance);
        Ok(())
    }

    async fn get(&self, id: u64) -> ApiResult<Option<Instance>> {
        let storage = self.storage.read().map_err(|_| poisoned())?;
        Ok(storage.get(&id).cloned())
    }

    async fn list(&self) -> ApiResult<Vec<Instance>> {
        let storage = self.storage.read().map_err(|_| poisoned())?;
        Ok(storage.values().cloned().collect())
    }

    async fn update_power_state(&self, id: u64, raw_power_state: &str) -> ApiResult<()> {
        let mut storage = self.storage.write().map_err(|_| poisoned())?;

        if let Some(instance) = storage.get_mut(&id) {
            instance.raw_power_state = raw_power_state.to_string();
            instance.state_changed_on = Some(Utc::now());
            Ok(())
        } else {
            Err(ApiError::instance_not_found(id))
        }
    }
}
