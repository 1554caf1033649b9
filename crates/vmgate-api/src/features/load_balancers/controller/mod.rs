use crate::features::authorization::service::{Authorizer, Caller, Privilege};
use crate::features::instance_management::service::InstanceService;
use crate::features::load_balancers::service::LoadBalancerService;
use crate::shared::error::ApiResult;
use crate::shared::types::{CollectionEnvelope, ListQuery, LoadBalancerResource};
use std::sync::Arc;
use tracing::info;

/// Controller for `/api/instances/:id/load_balancers`
pub struct LoadBalancerController {
    service: Arc<LoadBalancerService>,
    instances: Arc<InstanceService>,
    authorizer: Arc<dyn Authorizer>,
}

impl LoadBalancerController {
    pub fn new(
        service: Arc<LoadBalancerService>,
        instances: Arc<InstanceService>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            service,
            instances,
            authorizer,
        }
    }

    pub async fn list(
        &self,
        caller: &Caller,
        instance_id: &str,
        query: &ListQuery,
    ) -> ApiResult<CollectionEnvelope> {
        info!(userid = %caller.userid, instance_id = %instance_id, "Received list load balancers request");
        self.authorizer
            .authorize(caller, &Privilege::show_load_balancers())?;
        let instance = self
            .instances
            .find(InstanceService::parse_id(instance_id)?)
            .await?;
        self.service.list(instance.id, query).await
    }

    pub async fn show(
        &self,
        caller: &Caller,
        instance_id: &str,
        id: &str,
    ) -> ApiResult<LoadBalancerResource> {
        info!(userid = %caller.userid, instance_id = %instance_id, load_balancer_id = %id, "Received show load balancer request");
        self.authorizer
            .authorize(caller, &Privilege::show_load_balancers())?;
        let instance = self
            .instances
            .find(InstanceService::parse_id(instance_id)?)
            .await?;
        self.service
            .show(instance.id, LoadBalancerService::parse_id(id)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::authorization::service::RoleAuthorizer;
    use crate::features::custom_attributes::repo::InMemoryCustomAttributeRepository;
    use crate::features::instance_management::repo::{
        InMemoryInstanceRepository, InstanceRepository,
    };
    use crate::features::load_balancers::repo::InMemoryLoadBalancerRepository;
    use crate::shared::error::ApiError;
    use crate::shared::href::Hrefs;
    use vmgate_core::Instance;

    async fn create_test_controller() -> LoadBalancerController {
        let hrefs = Hrefs::new("http://h");
        let instances = Arc::new(InMemoryInstanceRepository::new());
        instances.upsert(Instance::new(1, "web")).await.unwrap();
        LoadBalancerController::new(
            Arc::new(LoadBalancerService::new(
                Arc::new(InMemoryLoadBalancerRepository::new()),
                hrefs.clone(),
            )),
            Arc::new(InstanceService::new(
                instances,
                Arc::new(InMemoryCustomAttributeRepository::new()),
                hrefs,
            )),
            Arc::new(RoleAuthorizer),
        )
    }

    #[tokio::test]
    async fn test_requires_privilege() {
        let controller = create_test_controller().await;
        let caller = Caller::new("u", "viewer", Vec::<String>::new());
        assert!(matches!(
            controller.list(&caller, "1", &ListQuery::default()).await,
            Err(ApiError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_listing_and_missing_show() {
        let controller = create_test_controller().await;
        let caller = Caller::new("u", "viewer", ["instance_load_balancers_show"]);

        let listing = controller
            .list(&caller, "1", &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(listing.count, 0);
        assert!(matches!(
            controller.show(&caller, "1", "3").await,
            Err(ApiError::ResourceNotFound(_))
        ));
    }
}
