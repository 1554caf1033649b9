use crate::features::authorization::service::{Authorizer, Caller, Privilege, PrivilegeScope};
use crate::features::instance_actions::service::{ActionDispatcher, Target};
use crate::features::instance_management::service::InstanceService;
use crate::shared::error::{ApiError, ApiResult};
use crate::shared::types::{
    ActionRequest, ActionResult, CollectionEnvelope, InstanceResource, ListQuery, ResultsEnvelope,
};
use std::sync::Arc;
use tracing::info;
use vmgate_core::InstanceAction;

/// Controller for the instances collection and its actions
pub struct InstanceController {
    service: Arc<InstanceService>,
    dispatcher: Arc<ActionDispatcher>,
    authorizer: Arc<dyn Authorizer>,
}

impl InstanceController {
    pub fn new(
        service: Arc<InstanceService>,
        dispatcher: Arc<ActionDispatcher>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            service,
            dispatcher,
            authorizer,
        }
    }

    pub async fn list_instances(
        &self,
        caller: &Caller,
        query: &ListQuery,
    ) -> ApiResult<CollectionEnvelope> {
        info!(userid = %caller.userid, "Received list instances request");
        self.authorizer
            .authorize(caller, &Privilege::list_instances())?;
        self.service.list(query).await
    }

    pub async fn cloud_instance_count(&self) -> ApiResult<usize> {
        self.service.cloud_instance_count().await
    }

    pub async fn show_instance(
        &self,
        caller: &Caller,
        id: &str,
        query: &ListQuery,
    ) -> ApiResult<InstanceResource> {
        info!(userid = %caller.userid, instance_id = %id, "Received show instance request");
        self.authorizer.authorize(caller, &Privilege::show_instance())?;
        let id = InstanceService::parse_id(id)?;
        self.service.show(id, query).await
    }

    /// Handle an action posted to a single instance.
    ///
    /// A missing privilege wins over a missing instance.
    pub async fn act_on_instance(
        &self,
        caller: &Caller,
        id: &str,
        request: ActionRequest,
    ) -> ApiResult<ActionResult> {
        let action: InstanceAction = request.action()?.parse()?;
        info!(userid = %caller.userid, instance_id = %id, action = %action, "Received instance action request");

        self.authorizer.authorize(
            caller,
            &Privilege::instance_action(action, PrivilegeScope::Resource),
        )?;
        let id = InstanceService::parse_id(id)?;
        let instance = self.service.find(id).await?;

        Ok(self.dispatcher.dispatch(action, instance).await)
    }

    /// Handle an action posted to the collection; one result per referenced instance.
    pub async fn act_on_collection(
        &self,
        caller: &Caller,
        request: ActionRequest,
    ) -> ApiResult<ResultsEnvelope<ActionResult>> {
        let action: InstanceAction = request.action()?.parse()?;
        self.authorizer.authorize(
            caller,
            &Privilege::instance_action(action, PrivilegeScope::Collection),
        )?;

        let items = request.into_items();
        if items.is_empty() {
            return Err(ApiError::BadRequest(
                "Must specify resources for the action".to_string(),
            ));
        }
        info!(userid = %caller.userid, action = %action, count = items.len(), "Received bulk instance action request");

        let mut targets: Vec<Target> = Vec::with_capacity(items.len());
        for item in &items {
            targets.push(self.service.resolve(item).await);
        }

        Ok(ResultsEnvelope::new(
            self.dispatcher.dispatch_all(action, targets).await,
        ))
    }
}
