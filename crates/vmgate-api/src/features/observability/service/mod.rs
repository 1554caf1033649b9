use crate::features::observability::repo::ObservabilityRepository;
use std::sync::Arc;
use vmgate_core::InstanceAction;

/// Outcome label of a dispatched instance action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Accepted,
    Rejected,
    NotFound,
    BackendError,
}

impl ActionOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionOutcome::Accepted => "accepted",
            ActionOutcome::Rejected => "rejected",
            ActionOutcome::NotFound => "not_found",
            ActionOutcome::BackendError => "backend_error",
        }
    }
}

pub struct ObservabilityService {
    repo: Arc<ObservabilityRepository>,
}

impl ObservabilityService {
    pub fn new(repo: Arc<ObservabilityRepository>) -> Self {
        Self { repo }
    }

    pub fn record_api_request(&self, endpoint: &str, status: &str, seconds: f64) {
        self.repo.observe_api_request(endpoint, status, seconds);
    }

    pub fn set_instance_count(&self, count: usize) {
        self.repo.set_instance_count(count as f64);
    }

    pub fn record_action(&self, action: InstanceAction, outcome: ActionOutcome) {
        self.repo.inc_instance_action(action.name(), outcome.as_str());
    }

    pub fn render_metrics(&self) -> Result<String, String> {
        self.repo.render_metrics()
    }
}
