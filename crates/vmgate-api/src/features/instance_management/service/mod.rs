use crate::features::custom_attributes::repo::CustomAttributeRepository;
use crate::features::instance_actions::service::Target;
use crate::features::instance_management::repo::InstanceRepository;
use crate::shared::error::{ApiError, ApiResult};
use crate::shared::href::{Hrefs, ResourceRef};
use crate::shared::types::{
    href_only, to_value, CollectionEnvelope, CustomAttributeResource, InstanceResource, ListQuery,
    ResourceReference,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use vmgate_core::Instance;

/// Read side of the instances collection. Only cloud instances are visible.
pub struct InstanceService {
    repo: Arc<dyn InstanceRepository>,
    custom_attributes: Arc<dyn CustomAttributeRepository>,
    hrefs: Hrefs,
}

impl InstanceService {
    pub fn new(
        repo: Arc<dyn InstanceRepository>,
        custom_attributes: Arc<dyn CustomAttributeRepository>,
        hrefs: Hrefs,
    ) -> Self {
        Self {
            repo,
            custom_attributes,
            hrefs,
        }
    }

    /// Parse a path segment as an instance id. Anything non-numeric is not found.
    pub fn parse_id(raw: &str) -> ApiResult<u64> {
        raw.trim()
            .parse()
            .map_err(|_| ApiError::instance_not_found(raw))
    }

    /// Resolve an id to a cloud instance.
    pub async fn find(&self, id: u64) -> ApiResult<Instance> {
        match self.repo.get(id).await? {
            Some(instance) if instance.is_cloud() => Ok(instance),
            Some(_) => {
                debug!(instance_id = id, "Instance is not a cloud instance");
                Err(ApiError::instance_not_found(id))
            }
            None => Err(ApiError::instance_not_found(id)),
        }
    }

    /// Resolve one entry of a bulk request. Failures become unresolved targets.
    pub async fn resolve(&self, item: &Value) -> Target {
        let reference = ResourceReference::from_value(item);
        let echo = reference.describe();

        let id = match reference.href.as_deref() {
            Some(href) => match Hrefs::parse(href) {
                Some(ResourceRef::Instance(id)) => Some(id),
                _ => None,
            },
            None => reference.numeric_id(),
        };

        let Some(id) = id else {
            let message = if echo.is_empty() {
                "Must specify an href or id".to_string()
            } else {
                format!("Couldn't find Instance with 'id'={}", echo)
            };
            return Target::Unresolved {
                href: echo,
                message,
            };
        };

        let href = reference.href.clone().unwrap_or_else(|| self.hrefs.instance(id));
        match self.find(id).await {
            Ok(instance) => Target::Resolved(instance),
            Err(e) => Target::Unresolved {
                href,
                message: not_found_message(e),
            },
        }
    }

    pub async fn list(&self, query: &ListQuery) -> ApiResult<CollectionEnvelope> {
        let cloud: Vec<Instance> = self
            .repo
            .list()
            .await?
            .into_iter()
            .filter(Instance::is_cloud)
            .collect();
        let count = cloud.len();

        let page = cloud
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX));

        let expand = query.expands("resources");
        let mut resources = Vec::new();
        for instance in page {
            if expand {
                resources.push(to_value(&InstanceResource::new(&instance, &self.hrefs))?);
            } else {
                resources.push(href_only(self.hrefs.instance(instance.id)));
            }
        }

        Ok(CollectionEnvelope {
            name: "instances".to_string(),
            count,
            subcount: resources.len(),
            resources,
        })
    }

    pub async fn show(&self, id: u64, query: &ListQuery) -> ApiResult<InstanceResource> {
        let instance = self.find(id).await?;
        let mut resource = InstanceResource::new(&instance, &self.hrefs);

        if query.expands("custom_attributes") {
            let attributes = self.custom_attributes.list_for_instance(id).await?;
            resource.custom_attributes = Some(
                attributes
                    .iter()
                    .map(|a| CustomAttributeResource::new(a, &self.hrefs))
                    .collect(),
            );
        }

        Ok(resource)
    }

    pub async fn cloud_instance_count(&self) -> ApiResult<usize> {
        Ok(self
            .repo
            .list()
            .await?
            .iter()
            .filter(|i| i.is_cloud())
            .count())
    }
}

fn not_found_message(err: ApiError) -> String {
    match err {
        ApiError::InstanceNotFound(msg) | ApiError::ResourceNotFound(msg) => msg,
        other => other.to_string(),
    }
}
