use crate::power::PowerState;
use crate::{CoreError, Instance};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const NOT_POWERED_ON: &str = "is not powered on";
pub const POWERED_ON: &str = "is powered on";
pub const TERMINATED: &str = "is terminated";
pub const CANNOT_SHELVE: &str =
    "The VM can't be shelved, current state has to be powered on, off, suspended or paused";

/// Lifecycle actions that can be requested on an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceAction {
    Start,
    Stop,
    Pause,
    Suspend,
    Shelve,
    RebootGuest,
    Reset,
    Terminate,
}

/// Reason an action cannot run given the instance's current power state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreconditionFailure {
    pub reason: &'static str,
}

impl fmt::Display for PreconditionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason)
    }
}

type Precondition = fn(PowerState) -> Result<(), PreconditionFailure>;

/// Row of the action table.
pub struct ActionSpec {
    pub action: InstanceAction,
    pub name: &'static str,
    pub gerund: &'static str,
    pub precondition: Precondition,
    /// Power state the backend drives the instance to once the task completes.
    pub target: PowerState,
}

fn require_on(state: PowerState) -> Result<(), PreconditionFailure> {
    match state {
        PowerState::On => Ok(()),
        _ => Err(PreconditionFailure {
            reason: NOT_POWERED_ON,
        }),
    }
}

/// Start: anything not running, except a terminated instance.
fn require_startable(state: PowerState) -> Result<(), PreconditionFailure> {
    match state {
        PowerState::On => Err(PreconditionFailure { reason: POWERED_ON }),
        PowerState::Terminated => Err(PreconditionFailure { reason: TERMINATED }),
        _ => Ok(()),
    }
}

fn require_shelvable(state: PowerState) -> Result<(), PreconditionFailure> {
    match state {
        PowerState::On | PowerState::Off | PowerState::Suspended | PowerState::Paused => Ok(()),
        _ => Err(PreconditionFailure {
            reason: CANNOT_SHELVE,
        }),
    }
}

fn always(_: PowerState) -> Result<(), PreconditionFailure> {
    Ok(())
}

static ACTION_TABLE: [ActionSpec; 8] = [
    ActionSpec {
        action: InstanceAction::Start,
        name: "start",
        gerund: "starting",
        precondition: require_startable,
        target: PowerState::On,
    },
    ActionSpec {
        action: InstanceAction::Stop,
        name: "stop",
        gerund: "stopping",
        precondition: require_on,
        target: PowerState::Off,
    },
    // Paused and suspended are not "on", so repeating these fails with the same message.
    ActionSpec {
        action: InstanceAction::Pause,
        name: "pause",
        gerund: "pausing",
        precondition: require_on,
        target: PowerState::Paused,
    },
    ActionSpec {
        action: InstanceAction::Suspend,
        name: "suspend",
        gerund: "suspending",
        precondition: require_on,
        target: PowerState::Suspended,
    },
    ActionSpec {
        action: InstanceAction::Shelve,
        name: "shelve",
        gerund: "shelving",
        precondition: require_shelvable,
        target: PowerState::Shelved,
    },
    ActionSpec {
        action: InstanceAction::RebootGuest,
        name: "reboot_guest",
        gerund: "rebooting",
        precondition: require_on,
        target: PowerState::On,
    },
    ActionSpec {
        action: InstanceAction::Reset,
        name: "reset",
        gerund: "resetting",
        precondition: require_on,
        target: PowerState::On,
    },
    ActionSpec {
        action: InstanceAction::Terminate,
        name: "terminate",
        gerund: "terminating",
        precondition: always,
        target: PowerState::Terminated,
    },
];

impl InstanceAction {
    pub const ALL: [InstanceAction; 8] = [
        InstanceAction::Start,
        InstanceAction::Stop,
        InstanceAction::Pause,
        InstanceAction::Suspend,
        InstanceAction::Shelve,
        InstanceAction::RebootGuest,
        InstanceAction::Reset,
        InstanceAction::Terminate,
    ];

    pub fn spec(self) -> &'static ActionSpec {
        // Table rows are declared in variant order.
        &ACTION_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn gerund(self) -> &'static str {
        self.spec().gerund
    }

    pub fn target_state(self) -> PowerState {
        self.spec().target
    }

    /// Check the instance's current power state against this action's precondition.
    pub fn validate(self, instance: &Instance) -> Result<(), PreconditionFailure> {
        (self.spec().precondition)(instance.power_state())
    }

    /// Message reported when the action was accepted for `instance`.
    pub fn accepted_message(self, instance: &Instance) -> String {
        format!("{} {}", instance.ident(), self.gerund())
    }
}

impl fmt::Display for InstanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InstanceAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ACTION_TABLE
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(s.trim()))
            .map(|spec| spec.action)
            .ok_or_else(|| CoreError::UnsupportedAction(s.to_string()))
    }
}
