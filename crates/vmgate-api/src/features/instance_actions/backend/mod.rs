use crate::shared::error::{ApiError, ApiResult};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;
use vmgate_core::InstanceAction;

/// Power operation handed to the execution backend once an action is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerCommand {
    pub instance_id: u64,
    pub action: InstanceAction,
    pub task_id: u64,
}

/// Backend that performs power operations.
///
/// `submit` returns once the command is accepted, not once the instance
/// reaches its target state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PowerBackend: Send + Sync {
    async fn submit(&self, command: PowerCommand) -> ApiResult<()>;
}

/// Backend that forwards commands to an in-process [`PowerWorker`](crate::features::instance_actions::worker::PowerWorker).
pub struct SimulatedPowerBackend {
    sender: mpsc::UnboundedSender<PowerCommand>,
}

impl SimulatedPowerBackend {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PowerCommand>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl PowerBackend for SimulatedPowerBackend {
    async fn submit(&self, command: PowerCommand) -> ApiResult<()> {
        debug!(
            instance_id = command.instance_id,
            action = %command.action,
            task_id = command.task_id,
            "Submitting power command"
        );
        self.sender
            .send(command)
            .map_err(|_| ApiError::BackendError("power worker is not running".to_string()))
    }
}
