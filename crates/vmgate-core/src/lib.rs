pub mod action;
pub mod power;

pub use action::{ActionSpec, InstanceAction, PreconditionFailure};
pub use power::PowerState;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),
}

/// Whether a VM is managed by a cloud provider or by an infrastructure provider.
/// Only cloud VMs are exposed as instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstanceKind {
    #[default]
    Cloud,
    Infra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub id: u64,
    pub guid: Uuid,
    pub name: String,
    pub vendor: String,
    pub kind: InstanceKind,
    pub raw_power_state: String,
    pub ems_id: Option<u64>,
    pub zone: Option<String>,
    pub host: Option<String>,
    pub created_on: DateTime<Utc>,
    pub state_changed_on: Option<DateTime<Utc>>,
}

impl Instance {
    /// New cloud instance reporting `ACTIVE`.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            guid: Uuid::new_v4(),
            name: name.into(),
            vendor: "openstack".to_string(),
            kind: InstanceKind::Cloud,
            raw_power_state: "ACTIVE".to_string(),
            ems_id: None,
            zone: None,
            host: None,
            created_on: Utc::now(),
            state_changed_on: None,
        }
    }

    pub fn with_raw_power_state(mut self, raw_power_state: impl Into<String>) -> Self {
        self.raw_power_state = raw_power_state.into();
        self
    }

    pub fn with_kind(mut self, kind: InstanceKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn power_state(&self) -> PowerState {
        PowerState::from_raw(&self.raw_power_state)
    }

    pub fn is_cloud(&self) -> bool {
        self.kind == InstanceKind::Cloud
    }

    /// Human readable identity used in action messages.
    pub fn ident(&self) -> String {
        format!("Instance id:{} name:'{}'", self.id, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAttribute {
    pub id: u64,
    pub instance_id: u64,
    pub name: String,
    pub value: String,
    pub section: String,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

pub const DEFAULT_CUSTOM_ATTRIBUTE_SECTION: &str = "metadata";

impl CustomAttribute {
    pub fn new(
        id: u64,
        instance_id: u64,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            instance_id,
            name: name.into(),
            value: value.into(),
            section: DEFAULT_CUSTOM_ATTRIBUTE_SECTION.to_string(),
            created_on: now,
            updated_on: now,
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub id: u64,
    pub name: String,
    pub ems_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerListener {
    pub id: u64,
    pub name: String,
    pub load_balancer_id: u64,
    pub pool_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerPool {
    pub id: u64,
    pub name: String,
    pub member_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerPoolMember {
    pub id: u64,
    pub instance_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Queued,
    Active,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Ok,
    Error,
}

/// Asynchronous unit of work spawned by an accepted action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub name: String,
    pub state: TaskState,
    pub status: TaskStatus,
    pub message: String,
    pub instance_id: Option<u64>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl Task {
    pub fn queued(id: u64, name: impl Into<String>, instance_id: Option<u64>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            state: TaskState::Queued,
            status: TaskStatus::Ok,
            message: "Task queued".to_string(),
            instance_id,
            created_on: now,
            updated_on: now,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == TaskState::Finished
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_defaults_to_powered_on_cloud_vm() {
        let instance = Instance::new(7, "web-1");
        assert_eq!(instance.kind, InstanceKind::Cloud);
        assert_eq!(instance.power_state(), PowerState::On);
        assert!(instance.is_cloud());
    }

    #[test]
    fn test_instance_ident_names_id_and_name() {
        let instance = Instance::new(42, "db");
        assert_eq!(instance.ident(), "Instance id:42 name:'db'");
    }

    #[test]
    fn test_instance_power_state_follows_raw_state() {
        let instance = Instance::new(1, "a").with_raw_power_state("poweredOff");
        assert_eq!(instance.power_state(), PowerState::Off);
    }

    #[test]
    fn test_infra_vm_is_not_cloud() {
        let vm = Instance::new(2, "esx-vm").with_kind(InstanceKind::Infra);
        assert!(!vm.is_cloud());
    }

    #[test]
    fn test_custom_attribute_default_section() {
        let ca = CustomAttribute::new(1, 10, "owner", "ops");
        assert_eq!(ca.section, DEFAULT_CUSTOM_ATTRIBUTE_SECTION);
        assert_eq!(ca.created_on, ca.updated_on);

        let ca = ca.with_section("tags");
        assert_eq!(ca.section, "tags");
    }

    #[test]
    fn test_task_starts_queued() {
        let task = Task::queued(3, "Instance id:1 name:'a' stopping", Some(1));
        assert_eq!(task.state, TaskState::Queued);
        assert_eq!(task.status, TaskStatus::Ok);
        assert!(!task.is_finished());
    }

    #[test]
    fn test_error_response_creation() {
        let response = ErrorResponse::new("BAD_REQUEST", "Must specify a name");
        assert_eq!(response.error_code, "BAD_REQUEST");
        assert_eq!(response.message, "Must specify a name");
    }

    #[test]
    fn test_error_response_json_shape() {
        let response = ErrorResponse::new("NOT_FOUND", "gone");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error_code"], "NOT_FOUND");
        assert_eq!(json["message"], "gone");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_instance_kind_serialization() {
        serde_test::assert_tokens(
            &InstanceKind::Cloud,
            &[serde_test::Token::UnitVariant {
                name: "InstanceKind",
                variant: "cloud",
            }],
        );
    }

    #[test]
    fn test_core_error_display() {
        let err = CoreError::UnsupportedAction("explode".to_string());
        assert_eq!(err.to_string(), "Unsupported action: explode");
    }
}
