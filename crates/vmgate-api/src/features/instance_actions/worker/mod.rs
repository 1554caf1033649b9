use crate::features::instance_actions::backend::PowerCommand;
use crate::features::instance_management::repo::InstanceRepository;
use crate::features::tasks::service::TaskService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// Applies queued power commands: waits out the simulated transition, writes
/// the target power state and completes the task.
///
/// Commands are applied one at a time, so concurrent requests on the same
/// instance are serialized here rather than in the API layer. On shutdown,
/// the in-flight transition and any commands still queued fail their tasks.
pub struct PowerWorker {
    instances: Arc<dyn InstanceRepository>,
    tasks: Arc<TaskService>,
    transition_delay: Duration,
}

impl PowerWorker {
    pub fn new(
        instances: Arc<dyn InstanceRepository>,
        tasks: Arc<TaskService>,
        transition_delay: Duration,
    ) -> Self {
        Self {
            instances,
            tasks,
            transition_delay,
        }
    }

    #[instrument(skip_all, name = "vmgate.task.power_worker")]
    pub async fn run(
        self,
        mut receiver: mpsc::UnboundedReceiver<PowerCommand>,
        cancel_token: CancellationToken,
    ) {
        info!(
            delay_ms = self.transition_delay.as_millis() as u64,
            "Starting power worker"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    info!("Power worker received shutdown signal, exiting");
                    break;
                }
                command = receiver.recv() => {
                    match command {
                        Some(command) => self.apply(command, &cancel_token).await,
                        None => break,
                    }
                }
            }
        }

        receiver.close();
        let mut abandoned = 0usize;
        while let Ok(command) = receiver.try_recv() {
            self.abandon(command, "Power worker shut down before the transition started")
                .await;
            abandoned += 1;
        }

        info!(abandoned, "Power worker stopped");
    }

    /// Apply one command. Cancellation during the transition fails the task
    /// and leaves the power state untouched.
    pub async fn apply(&self, command: PowerCommand, cancel_token: &CancellationToken) {
        if let Err(e) = self.tasks.mark_active(command.task_id).await {
            error!(task_id = command.task_id, error = %e, "Failed to activate task");
        }

        if !self.transition_delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(self.transition_delay) => {}
                _ = cancel_token.cancelled() => {
                    self.abandon(command, "Power transition interrupted by shutdown")
                        .await;
                    return;
                }
            }
        }

        let target = command.action.target_state();
        let outcome = self
            .instances
            .update_power_state(command.instance_id, target.canonical_raw())
            .await;

        let recorded = match outcome {
            Ok(()) => {
                info!(
                    instance_id = command.instance_id,
                    action = %command.action,
                    power_state = %target,
                    "Power transition completed"
                );
                self.tasks
                    .finish(
                        command.task_id,
                        format!("Instance id:{} {} completed", command.instance_id, command.action),
                    )
                    .await
            }
            Err(e) => {
                error!(instance_id = command.instance_id, error = %e, "Power transition failed");
                self.tasks.fail(command.task_id, e.to_string()).await
            }
        };

        if let Err(e) = recorded {
            error!(task_id = command.task_id, error = %e, "Failed to record task outcome");
        }
    }

    async fn abandon(&self, command: PowerCommand, reason: &str) {
        warn!(
            instance_id = command.instance_id,
            task_id = command.task_id,
            action = %command.action,
            reason,
            "Power command abandoned"
        );
        if let Err(e) = self.tasks.fail(command.task_id, reason).await {
            error!(task_id = command.task_id, error = %e, "Failed to record task outcome");
        }
    }
}
