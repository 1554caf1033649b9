use crate::features::authorization::service::{Authorizer, Caller, Privilege};
use crate::features::custom_attributes::service::{CustomAttributeAction, CustomAttributeService};
use crate::features::instance_management::service::InstanceService;
use crate::shared::error::ApiResult;
use crate::shared::types::{
    ActionRequest, ActionResult, CollectionEnvelope, CustomAttributeResource, ListQuery,
    ResultsEnvelope,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Body returned by POST on the subcollection.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CustomAttributeResults {
    Attributes(ResultsEnvelope<CustomAttributeResource>),
    Outcomes(ResultsEnvelope<ActionResult>),
}

/// Controller for `/api/instances/:id/custom_attributes`.
///
/// Reads need an authenticated caller only; writes are gated per action.
pub struct CustomAttributeController {
    service: Arc<CustomAttributeService>,
    instances: Arc<InstanceService>,
    authorizer: Arc<dyn Authorizer>,
}

impl CustomAttributeController {
    pub fn new(
        service: Arc<CustomAttributeService>,
        instances: Arc<InstanceService>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            service,
            instances,
            authorizer,
        }
    }

    async fn parent(&self, instance_id: &str) -> ApiResult<u64> {
        let id = InstanceService::parse_id(instance_id)?;
        Ok(self.instances.find(id).await?.id)
    }

    pub async fn list(
        &self,
        caller: &Caller,
        instance_id: &str,
        query: &ListQuery,
    ) -> ApiResult<CollectionEnvelope> {
        info!(userid = %caller.userid, instance_id = %instance_id, "Received list custom attributes request");
        let instance_id = self.parent(instance_id).await?;
        self.service.list(instance_id, query).await
    }

    pub async fn show(
        &self,
        caller: &Caller,
        instance_id: &str,
        id: &str,
    ) -> ApiResult<CustomAttributeResource> {
        info!(userid = %caller.userid, instance_id = %instance_id, attribute_id = %id, "Received show custom attribute request");
        let instance_id = self.parent(instance_id).await?;
        let id = CustomAttributeService::parse_id(id)?;
        self.service.show(instance_id, id).await
    }

    pub async fn act(
        &self,
        caller: &Caller,
        instance_id: &str,
        request: ActionRequest,
    ) -> ApiResult<CustomAttributeResults> {
        let action = CustomAttributeAction::parse(request.action()?)?;
        info!(userid = %caller.userid, instance_id = %instance_id, action = ?action, "Received custom attribute action request");

        let privilege = match action {
            CustomAttributeAction::Add | CustomAttributeAction::Edit => {
                Privilege::edit_custom_attributes()
            }
            CustomAttributeAction::Delete => Privilege::delete_custom_attributes(),
        };
        self.authorizer.authorize(caller, &privilege)?;

        let instance_id = self.parent(instance_id).await?;
        let items = request.into_items();

        Ok(match action {
            CustomAttributeAction::Add => CustomAttributeResults::Attributes(ResultsEnvelope::new(
                self.service.add(instance_id, &items).await?,
            )),
            CustomAttributeAction::Edit => CustomAttributeResults::Attributes(
                ResultsEnvelope::new(self.service.edit(instance_id, &items).await?),
            ),
            CustomAttributeAction::Delete => CustomAttributeResults::Outcomes(
                ResultsEnvelope::new(self.service.delete(instance_id, &items).await?),
            ),
        })
    }

    pub async fn delete_one(&self, caller: &Caller, instance_id: &str, id: &str) -> ApiResult<()> {
        info!(userid = %caller.userid, instance_id = %instance_id, attribute_id = %id, "Received delete custom attribute request");
        self.authorizer
            .authorize(caller, &Privilege::delete_custom_attributes())?;
        let instance_id = self.parent(instance_id).await?;
        let id = CustomAttributeService::parse_id(id)?;
        self.service.delete_one(instance_id, id).await
    }
}
