use crate::features::load_balancers::repo::LoadBalancerRepository;
use crate::shared::error::{ApiError, ApiResult};
use crate::shared::href::Hrefs;
use crate::shared::types::{href_only, to_value, CollectionEnvelope, ListQuery, LoadBalancerResource};
use std::sync::Arc;

pub fn load_balancer_not_found(id: impl std::fmt::Display) -> ApiError {
    ApiError::ResourceNotFound(format!("Couldn't find LoadBalancer with 'id'={}", id))
}

pub struct LoadBalancerService {
    repo: Arc<dyn LoadBalancerRepository>,
    hrefs: Hrefs,
}

impl LoadBalancerService {
    pub fn new(repo: Arc<dyn LoadBalancerRepository>, hrefs: Hrefs) -> Self {
        Self { repo, hrefs }
    }

    pub fn parse_id(raw: &str) -> ApiResult<u64> {
        raw.trim().parse().map_err(|_| load_balancer_not_found(raw))
    }

    pub async fn list(&self, instance_id: u64, query: &ListQuery) -> ApiResult<CollectionEnvelope> {
        let load_balancers = self.repo.for_instance(instance_id).await?;
        let expand = query.expands("resources");

        let mut resources = Vec::with_capacity(load_balancers.len());
        for lb in &load_balancers {
            if expand {
                resources.push(to_value(&LoadBalancerResource::new(instance_id, lb, &self.hrefs))?);
            } else {
                resources.push(href_only(self.hrefs.load_balancer(instance_id, lb.id)));
            }
        }

        Ok(CollectionEnvelope {
            name: "load_balancers".to_string(),
            count: resources.len(),
            subcount: resources.len(),
            resources,
        })
    }

    /// Show a load balancer, which must be linked to the instance.
    pub async fn show(&self, instance_id: u64, id: u64) -> ApiResult<LoadBalancerResource> {
        self.repo
            .for_instance(instance_id)
            .await?
            .into_iter()
            .find(|lb| lb.id == id)
            .map(|lb| LoadBalancerResource::new(instance_id, &lb, &self.hrefs))
            .ok_or_else(|| load_balancer_not_found(id))
    }
}
