use crate::features::instance_actions::backend::{PowerBackend, PowerCommand};
use crate::features::observability::controller::ObservabilityController;
use crate::features::observability::service::ActionOutcome;
use crate::features::tasks::service::TaskService;
use crate::shared::href::Hrefs;
use crate::shared::types::ActionResult;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};
use vmgate_core::{Instance, InstanceAction};

/// One entry of a dispatch request after lookup.
#[derive(Debug, Clone)]
pub enum Target {
    Resolved(Instance),
    /// Reference that did not resolve; reported back as a failed result.
    Unresolved { href: String, message: String },
}

/// Validates and submits actions, one result per target.
pub struct ActionDispatcher {
    backend: Arc<dyn PowerBackend>,
    tasks: Arc<TaskService>,
    observability: Arc<ObservabilityController>,
    hrefs: Hrefs,
}

impl ActionDispatcher {
    pub fn new(
        backend: Arc<dyn PowerBackend>,
        tasks: Arc<TaskService>,
        observability: Arc<ObservabilityController>,
        hrefs: Hrefs,
    ) -> Self {
        Self {
            backend,
            tasks,
            observability,
            hrefs,
        }
    }

    /// Dispatch `action` to every target concurrently. Results keep the order of `targets`.
    pub async fn dispatch_all(&self, action: InstanceAction, targets: Vec<Target>) -> Vec<ActionResult> {
        join_all(targets.into_iter().map(|target| self.dispatch_target(action, target))).await
    }

    pub async fn dispatch(&self, action: InstanceAction, instance: Instance) -> ActionResult {
        self.dispatch_target(action, Target::Resolved(instance)).await
    }

    async fn dispatch_target(&self, action: InstanceAction, target: Target) -> ActionResult {
        match target {
            Target::Resolved(instance) => self.dispatch_instance(action, &instance).await,
            Target::Unresolved { href, message } => {
                self.observability.record_action(action, ActionOutcome::NotFound);
                ActionResult::failure(message, href)
            }
        }
    }

    async fn dispatch_instance(&self, action: InstanceAction, instance: &Instance) -> ActionResult {
        let href = self.hrefs.instance(instance.id);

        if let Err(failure) = action.validate(instance) {
            info!(
                instance_id = instance.id,
                action = %action,
                power_state = %instance.power_state(),
                reason = %failure,
                "Action rejected by precondition"
            );
            self.observability.record_action(action, ActionOutcome::Rejected);
            return ActionResult::failure(failure.to_string(), href);
        }

        let message = action.accepted_message(instance);
        let task = match self.tasks.queue(message.clone(), Some(instance.id)).await {
            Ok(task) => task,
            Err(e) => {
                warn!(instance_id = instance.id, action = %action, error = %e, "Failed to queue task");
                self.observability.record_action(action, ActionOutcome::BackendError);
                return ActionResult::failure(e.to_string(), href);
            }
        };

        let command = PowerCommand {
            instance_id: instance.id,
            action,
            task_id: task.id,
        };
        if let Err(e) = self.backend.submit(command).await {
            warn!(instance_id = instance.id, action = %action, error = %e, "Backend rejected action");
            if let Err(fail_err) = self.tasks.fail(task.id, e.to_string()).await {
                warn!(task_id = task.id, error = %fail_err, "Failed to record task failure");
            }
            self.observability.record_action(action, ActionOutcome::BackendError);
            return ActionResult::failure(format!("{} failed: {}", instance.ident(), e), href);
        }

        info!(instance_id = instance.id, action = %action, task_id = task.id, "Action accepted");
        self.observability.record_action(action, ActionOutcome::Accepted);
        ActionResult::success(message, href).with_task(&task, &self.hrefs)
    }
}
