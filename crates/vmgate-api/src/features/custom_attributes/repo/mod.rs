use crate::shared::error::{ApiError, ApiResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use vmgate_core::{CustomAttribute, DEFAULT_CUSTOM_ATTRIBUTE_SECTION};

/// Storage for custom attributes, keyed by attribute id and scoped by owning instance.
#[async_trait]
pub trait CustomAttributeRepository: Send + Sync {
    /// Update the attribute holding `name` on the instance, or create it with a
    /// fresh id. Names stay unique per instance.
    async fn upsert_by_name(
        &self,
        instance_id: u64,
        name: String,
        value: Option<String>,
        section: Option<String>,
    ) -> ApiResult<CustomAttribute>;

    /// Store an attribute with its existing id (seed data)
    async fn restore(&self, attribute: CustomAttribute) -> ApiResult<()>;

    async fn get(&self, instance_id: u64, id: u64) -> ApiResult<Option<CustomAttribute>>;

    async fn find_by_name(&self, instance_id: u64, name: &str)
        -> ApiResult<Option<CustomAttribute>>;

    /// All attributes of an instance, ordered by id
    async fn list_for_instance(&self, instance_id: u64) -> ApiResult<Vec<CustomAttribute>>;

    async fn update(
        &self,
        instance_id: u64,
        id: u64,
        value: Option<String>,
        section: Option<String>,
    ) -> ApiResult<CustomAttribute>;

    /// Remove an attribute, returning it if it existed
    async fn delete(&self, instance_id: u64, id: u64) -> ApiResult<Option<CustomAttribute>>;
}

#[derive(Clone)]
pub struct InMemoryCustomAttributeRepository {
    attributes: Arc<RwLock<BTreeMap<u64, CustomAttribute>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryCustomAttributeRepository {
    pub fn new() -> Self {
        Self {
            attributes: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for InMemoryCustomAttributeRepository {
    fn default() -> Self {
        Self::new()
    }
}

pub fn custom_attribute_not_found(id: impl std::fmt::Display) -> ApiError {
    ApiError::ResourceNotFound(format!("Couldn't find CustomAttribute with 'id'={}", id))
}

#[async_trait]
impl CustomAttributeRepository for InMemoryCustomAttributeRepository {
    async fn upsert_by_name(
        &self,
        instance_id: u64,
        name: String,
        value: Option<String>,
        section: Option<String>,
    ) -> ApiResult<CustomAttribute> {
        let mut attributes = self.attributes.write().await;

        if let Some(existing) = attributes
            .values_mut()
            .find(|a| a.instance_id == instance_id && a.name == name)
        {
            if let Some(value) = value {
                existing.value = value;
            }
            if let Some(section) = section {
                existing.section = section;
            }
            existing.updated_on = Utc::now();
            return Ok(existing.clone());
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let attribute = CustomAttribute::new(id, instance_id, name, value.unwrap_or_default())
            .with_section(section.unwrap_or_else(|| DEFAULT_CUSTOM_ATTRIBUTE_SECTION.to_string()));
        attributes.insert(id, attribute.clone());
        Ok(attribute)
    }

    async fn restore(&self, attribute: CustomAttribute) -> ApiResult<()> {
        self.next_id.fetch_max(attribute.id + 1, Ordering::SeqCst);
        let mut attributes = self.attributes.write().await;
        attributes.insert(attribute.id, attribute);
        Ok(())
    }

    async fn get(&self, instance_id: u64, id: u64) -> ApiResult<Option<CustomAttribute>> {
        let attributes = self.attributes.read().await;
        Ok(attributes
            .get(&id)
            .filter(|a| a.instance_id == instance_id)
            .cloned())
    }

    async fn find_by_name(
        &self,
        instance_id: u64,
        name: &str,
    ) -> ApiResult<Option<CustomAttribute>> {
        let attributes = self.attributes.read().await;
        Ok(attributes
            .values()
            .find(|a| a.instance_id == instance_id && a.name == name)
            .cloned())
    }

    async fn list_for_instance(&self, instance_id: u64) -> ApiResult<Vec<CustomAttribute>> {
        let attributes = self.attributes.read().await;
        Ok(attributes
            .values()
            .filter(|a| a.instance_id == instance_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        instance_id: u64,
        id: u64,
        value: Option<String>,
        section: Option<String>,
    ) -> ApiResult<CustomAttribute> {
        let mut attributes = self.attributes.write().await;
        let attribute = attributes
            .get_mut(&id)
            .filter(|a| a.instance_id == instance_id)
            .ok_or_else(|| custom_attribute_not_found(id))?;

        if let Some(value) = value {
            attribute.value = value;
        }
        if let Some(section) = section {
            attribute.section = section;
        }
        attribute.updated_on = Utc::now();
        Ok(attribute.clone())
    }

    async fn delete(&self, instance_id: u64, id: u64) -> ApiResult<Option<CustomAttribute>> {
        let mut attributes = self.attributes.write().await;
        let owned = attributes
            .get(&id)
            .map(|a| a.instance_id == instance_id)
            .unwrap_or(false);
        Ok(if owned { attributes.remove(&id) } else { None })
    }
}
