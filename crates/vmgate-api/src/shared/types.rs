use crate::shared::error::{ApiError, ApiResult};
use crate::shared::href::Hrefs;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vmgate_core::{CustomAttribute, Instance, LoadBalancer, Task};

pub use vmgate_core::{InstanceAction, PowerState};

/// Body of a POST carrying an action.
///
/// Targets come from `resources`, else `resource`, else any remaining
/// top-level fields taken as a single resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionRequest {
    pub action: Option<String>,
    pub resource: Option<Value>,
    pub resources: Option<Vec<Value>>,
    #[serde(flatten)]
    pub inline: Map<String, Value>,
}

impl ActionRequest {
    pub fn parse(body: &[u8]) -> ApiResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ApiError::BadRequest("Missing request body".to_string()));
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
    }

    pub fn action(&self) -> ApiResult<&str> {
        self.action
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Must specify an action".to_string()))
    }

    pub fn into_items(self) -> Vec<Value> {
        if let Some(resources) = self.resources {
            resources
        } else if let Some(resource) = self.resource {
            vec![resource]
        } else if !self.inline.is_empty() {
            vec![Value::Object(self.inline)]
        } else {
            Vec::new()
        }
    }
}

/// Reference to an existing resource inside an action body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceReference {
    pub href: Option<String>,
    pub id: Option<Value>,
}

impl ResourceReference {
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// Id given as a number or numeric string.
    pub fn numeric_id(&self) -> Option<u64> {
        match self.id.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Text used to echo the reference back in a failure result.
    pub fn describe(&self) -> String {
        self.href
            .clone()
            .or_else(|| self.id.as_ref().map(|id| id.to_string()))
            .unwrap_or_default()
    }
}

/// Outcome of an action on one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_href: Option<String>,
}

impl ActionResult {
    pub fn success(message: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            href: href.into(),
            task_id: None,
            task_href: None,
        }
    }

    pub fn failure(message: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            href: href.into(),
            task_id: None,
            task_href: None,
        }
    }

    pub fn with_task(mut self, task: &Task, hrefs: &Hrefs) -> Self {
        self.task_id = Some(task.id.to_string());
        self.task_href = Some(hrefs.task(task.id));
        self
    }

    pub fn has_task(&self) -> bool {
        self.task_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsEnvelope<T> {
    pub results: Vec<T>,
}

impl<T> ResultsEnvelope<T> {
    pub fn new(results: Vec<T>) -> Self {
        Self { results }
    }
}

/// Listing of a collection or subcollection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionEnvelope {
    pub name: String,
    pub count: usize,
    pub subcount: usize,
    pub resources: Vec<Value>,
}

/// Query options accepted by GET endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub expand: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn expands(&self, what: &str) -> bool {
        self.expand
            .as_deref()
            .map(|e| e.split(',').any(|part| part.trim() == what))
            .unwrap_or(false)
    }

    pub fn expand(what: &str) -> Self {
        Self {
            expand: Some(what.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InstanceResource {
    pub href: String,
    pub id: String,
    pub guid: String,
    pub name: String,
    pub vendor: String,
    pub raw_power_state: String,
    pub power_state: PowerState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ems_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub created_on: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_changed_on: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_attributes: Option<Vec<CustomAttributeResource>>,
}

impl InstanceResource {
    pub fn new(instance: &Instance, hrefs: &Hrefs) -> Self {
        Self {
            href: hrefs.instance(instance.id),
            id: instance.id.to_string(),
            guid: instance.guid.to_string(),
            name: instance.name.clone(),
            vendor: instance.vendor.clone(),
            raw_power_state: instance.raw_power_state.clone(),
            power_state: instance.power_state(),
            ems_id: instance.ems_id.map(|id| id.to_string()),
            zone: instance.zone.clone(),
            host: instance.host.clone(),
            created_on: instance.created_on,
            state_changed_on: instance.state_changed_on,
            custom_attributes: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomAttributeResource {
    pub href: String,
    pub id: String,
    pub resource_id: String,
    pub resource_type: &'static str,
    pub name: String,
    pub value: String,
    pub section: String,
    pub created_on: chrono::DateTime<chrono::Utc>,
    pub updated_on: chrono::DateTime<chrono::Utc>,
}

impl CustomAttributeResource {
    pub fn new(attribute: &CustomAttribute, hrefs: &Hrefs) -> Self {
        Self {
            href: hrefs.custom_attribute(attribute.instance_id, attribute.id),
            id: attribute.id.to_string(),
            resource_id: attribute.instance_id.to_string(),
            resource_type: "Instance",
            name: attribute.name.clone(),
            value: attribute.value.clone(),
            section: attribute.section.clone(),
            created_on: attribute.created_on,
            updated_on: attribute.updated_on,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadBalancerResource {
    pub href: String,
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ems_ref: Option<String>,
}

impl LoadBalancerResource {
    pub fn new(instance_id: u64, load_balancer: &LoadBalancer, hrefs: &Hrefs) -> Self {
        Self {
            href: hrefs.load_balancer(instance_id, load_balancer.id),
            id: load_balancer.id.to_string(),
            name: load_balancer.name.clone(),
            ems_ref: load_balancer.ems_ref.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskResource {
    pub href: String,
    pub id: String,
    pub name: String,
    pub state: vmgate_core::TaskState,
    pub status: vmgate_core::TaskStatus,
    pub message: String,
    pub created_on: chrono::DateTime<chrono::Utc>,
    pub updated_on: chrono::DateTime<chrono::Utc>,
}

impl TaskResource {
    pub fn new(task: &Task, hrefs: &Hrefs) -> Self {
        Self {
            href: hrefs.task(task.id),
            id: task.id.to_string(),
            name: task.name.clone(),
            state: task.state,
            status: task.status,
            message: task.message.clone(),
            created_on: task.created_on,
            updated_on: task.updated_on,
        }
    }
}

/// `{"href": ...}` stub used in unexpanded listings.
pub fn href_only(href: String) -> Value {
    serde_json::json!({ "href": href })
}

/// Serialize a presenter into a JSON value for an expanded listing.
pub fn to_value<T: Serialize>(resource: &T) -> ApiResult<Value> {
    serde_json::to_value(resource).map_err(|e| ApiError::StorageError(e.to_string()))
}
