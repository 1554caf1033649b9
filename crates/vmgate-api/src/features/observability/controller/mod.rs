use crate::features::observability::repo::ObservabilityRepository;
use crate::features::observability::service::{ActionOutcome, ObservabilityService};
use std::sync::{Arc, OnceLock};
use vmgate_core::InstanceAction;

pub struct ObservabilityController {
    service: ObservabilityService,
}

impl ObservabilityController {
    pub fn new(service: ObservabilityService) -> Self {
        Self { service }
    }

    /// Controller over a fresh registry, used where metrics must not be shared.
    pub fn isolated() -> Result<Self, String> {
        let repo = Arc::new(ObservabilityRepository::new()?);
        Ok(Self::new(ObservabilityService::new(repo)))
    }

    pub fn record_api_request(&self, endpoint: &str, status: &str, seconds: f64) {
        self.service.record_api_request(endpoint, status, seconds);
    }

    pub fn set_instance_count(&self, count: usize) {
        self.service.set_instance_count(count);
    }

    pub fn record_action(&self, action: InstanceAction, outcome: ActionOutcome) {
        self.service.record_action(action, outcome);
    }

    pub fn render_metrics(&self) -> Result<String, String> {
        self.service.render_metrics()
    }
}

static GLOBAL_OBSERVABILITY: OnceLock<Arc<ObservabilityController>> = OnceLock::new();

/// Process-wide controller served at `/metrics`.
pub fn global_observability_controller() -> Result<Arc<ObservabilityController>, String> {
    if let Some(controller) = GLOBAL_OBSERVABILITY.get() {
        return Ok(controller.clone());
    }
    let controller = Arc::new(ObservabilityController::isolated()?);
    Ok(GLOBAL_OBSERVABILITY.get_or_init(|| controller).clone())
}
