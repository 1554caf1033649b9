use crate::features::custom_attributes::repo::{
    custom_attribute_not_found, CustomAttributeRepository,
};
use crate::shared::error::{ApiError, ApiResult};
use crate::shared::href::{Hrefs, ResourceRef};
use crate::shared::types::{
    href_only, to_value, ActionResult, CollectionEnvelope, CustomAttributeResource, ListQuery,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use vmgate_core::CustomAttribute;

/// Actions accepted by POST on the custom_attributes subcollection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomAttributeAction {
    Add,
    Edit,
    Delete,
}

impl CustomAttributeAction {
    pub fn parse(action: &str) -> ApiResult<Self> {
        match action.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            _ => Err(ApiError::BadRequest(format!(
                "Unsupported Action {} for the custom_attributes subcollection",
                action
            ))),
        }
    }
}

/// One item of an add/edit/delete body.
#[derive(Debug, Clone, Default, Deserialize)]
struct AttributeInput {
    href: Option<String>,
    id: Option<Value>,
    name: Option<String>,
    value: Option<Value>,
    section: Option<String>,
}

impl AttributeInput {
    fn parse(item: &Value) -> Result<Self, String> {
        serde_json::from_value(item.clone()).map_err(|e| format!("Invalid custom attribute: {}", e))
    }

    fn from_value(item: &Value) -> ApiResult<Self> {
        Self::parse(item).map_err(ApiError::BadRequest)
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// Values are stored as text; non-string JSON keeps its literal form.
    fn value_text(&self) -> Option<String> {
        self.value.as_ref().map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    fn numeric_id(&self) -> Option<u64> {
        match self.id.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        self.href
            .clone()
            .or_else(|| self.id.as_ref().map(|id| id.to_string()))
            .or_else(|| self.name.clone())
            .unwrap_or_default()
    }
}

/// Where an input item points inside the parent instance's attribute set.
enum Locator<'a> {
    Id(u64),
    Name(&'a str),
    /// An href outside the parent's attributes; never matches.
    Foreign,
}

pub struct CustomAttributeService {
    repo: Arc<dyn CustomAttributeRepository>,
    hrefs: Hrefs,
}

impl CustomAttributeService {
    pub fn new(repo: Arc<dyn CustomAttributeRepository>, hrefs: Hrefs) -> Self {
        Self { repo, hrefs }
    }

    pub fn parse_id(raw: &str) -> ApiResult<u64> {
        raw.trim().parse().map_err(|_| custom_attribute_not_found(raw))
    }

    pub async fn list(&self, instance_id: u64, query: &ListQuery) -> ApiResult<CollectionEnvelope> {
        let attributes = self.repo.list_for_instance(instance_id).await?;
        let expand = query.expands("resources");

        let mut resources = Vec::with_capacity(attributes.len());
        for attribute in &attributes {
            if expand {
                resources.push(to_value(&CustomAttributeResource::new(attribute, &self.hrefs))?);
            } else {
                resources.push(href_only(
                    self.hrefs.custom_attribute(instance_id, attribute.id),
                ));
            }
        }

        Ok(CollectionEnvelope {
            name: "custom_attributes".to_string(),
            count: resources.len(),
            subcount: resources.len(),
            resources,
        })
    }

    pub async fn show(&self, instance_id: u64, id: u64) -> ApiResult<CustomAttributeResource> {
        let attribute = self
            .repo
            .get(instance_id, id)
            .await?
            .ok_or_else(|| custom_attribute_not_found(id))?;
        Ok(CustomAttributeResource::new(&attribute, &self.hrefs))
    }

    /// Add attributes. An existing name is updated in place so names stay unique.
    ///
    /// Every item is checked for a name before anything is written.
    pub async fn add(
        &self,
        instance_id: u64,
        items: &[Value],
    ) -> ApiResult<Vec<CustomAttributeResource>> {
        let inputs = items
            .iter()
            .map(AttributeInput::from_value)
            .collect::<ApiResult<Vec<_>>>()?;
        if inputs.is_empty() || inputs.iter().any(|input| input.name().is_none()) {
            return Err(ApiError::BadRequest("Must specify a name".to_string()));
        }

        let mut results = Vec::with_capacity(inputs.len());
        for input in &inputs {
            let name = input.name().unwrap_or_default();
            let attribute = self
                .repo
                .upsert_by_name(
                    instance_id,
                    name.to_string(),
                    input.value_text(),
                    input.section.clone(),
                )
                .await?;
            debug!(instance_id, attribute_id = attribute.id, attribute_name = name, "Custom attribute stored");
            results.push(CustomAttributeResource::new(&attribute, &self.hrefs));
        }

        info!(instance_id, count = results.len(), "Custom attributes added");
        Ok(results)
    }

    /// Edit attributes located by href, id or name. All items resolve before any write.
    pub async fn edit(
        &self,
        instance_id: u64,
        items: &[Value],
    ) -> ApiResult<Vec<CustomAttributeResource>> {
        let inputs = items
            .iter()
            .map(AttributeInput::from_value)
            .collect::<ApiResult<Vec<_>>>()?;
        if inputs.is_empty() {
            return Err(ApiError::BadRequest(
                "Must specify a name or href".to_string(),
            ));
        }

        let mut located = Vec::with_capacity(inputs.len());
        for input in &inputs {
            let locator = self.locate(instance_id, input).ok_or_else(|| {
                ApiError::BadRequest("Must specify a name or href".to_string())
            })?;
            let attribute = self
                .lookup(instance_id, &locator)
                .await?
                .ok_or_else(|| custom_attribute_not_found(input.describe()))?;
            located.push((attribute, input));
        }

        let mut results = Vec::with_capacity(located.len());
        for (attribute, input) in located {
            let updated = self
                .repo
                .update(
                    instance_id,
                    attribute.id,
                    input.value_text(),
                    input.section.clone(),
                )
                .await?;
            results.push(CustomAttributeResource::new(&updated, &self.hrefs));
        }

        info!(instance_id, count = results.len(), "Custom attributes edited");
        Ok(results)
    }

    /// Delete attributes; one result per item, absent attributes are per-item failures.
    pub async fn delete(&self, instance_id: u64, items: &[Value]) -> ApiResult<Vec<ActionResult>> {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let input = match AttributeInput::parse(item) {
                Ok(input) => input,
                Err(message) => {
                    results.push(ActionResult::failure(message, item.to_string()));
                    continue;
                }
            };
            let echo = input.describe();

            let Some(locator) = self.locate(instance_id, &input) else {
                results.push(ActionResult::failure("Must specify an id, href or name", echo));
                continue;
            };

            let target = self.lookup(instance_id, &locator).await?;
            let removed = match target {
                Some(attribute) => self.repo.delete(instance_id, attribute.id).await?,
                None => None,
            };

            results.push(match removed {
                Some(attribute) => ActionResult::success(
                    format!(
                        "Deleting CustomAttribute id:{} name:'{}'",
                        attribute.id, attribute.name
                    ),
                    self.hrefs.custom_attribute(instance_id, attribute.id),
                ),
                None => {
                    let id = match locator {
                        Locator::Id(id) => id.to_string(),
                        _ => echo.clone(),
                    };
                    ActionResult::failure(
                        format!("Couldn't find CustomAttribute with 'id'={}", id),
                        echo,
                    )
                }
            });
        }
        Ok(results)
    }

    /// Remove one attribute by id.
    pub async fn delete_one(&self, instance_id: u64, id: u64) -> ApiResult<()> {
        match self.repo.delete(instance_id, id).await? {
            Some(attribute) => {
                info!(instance_id, attribute_id = id, attribute_name = %attribute.name, "Custom attribute deleted");
                Ok(())
            }
            None => Err(custom_attribute_not_found(id)),
        }
    }

    fn locate<'a>(&self, instance_id: u64, input: &'a AttributeInput) -> Option<Locator<'a>> {
        if let Some(href) = input.href.as_deref() {
            return Some(match Hrefs::parse(href) {
                Some(ResourceRef::CustomAttribute {
                    instance_id: owner,
                    id,
                }) if owner == instance_id => Locator::Id(id),
                _ => Locator::Foreign,
            });
        }
        if let Some(id) = input.numeric_id() {
            return Some(Locator::Id(id));
        }
        input.name().map(Locator::Name)
    }

    async fn lookup(
        &self,
        instance_id: u64,
        locator: &Locator<'_>,
    ) -> ApiResult<Option<CustomAttribute>> {
        match locator {
            Locator::Id(id) => self.repo.get(instance_id, *id).await,
            Locator::Name(name) => self.repo.find_by_name(instance_id, name).await,
            Locator::Foreign => Ok(None),
        }
    }
}
