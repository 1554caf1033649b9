use serde::{Deserialize, Serialize};
use std::fmt;

/// Power-state family a backend-reported raw state belongs to.
///
/// Providers report free-form strings (`poweredOff`, `SHUTOFF`, `ACTIVE`, ...);
/// matching is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    On,
    Off,
    Suspended,
    Paused,
    Shelved,
    Terminated,
    Unknown,
}

impl PowerState {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "on" | "poweredon" | "active" | "running" | "up" => PowerState::On,
            "off" | "poweredoff" | "shutoff" | "stopped" | "shutdown" | "down" => PowerState::Off,
            "suspended" => PowerState::Suspended,
            "paused" => PowerState::Paused,
            "shelved" | "shelved_offloaded" => PowerState::Shelved,
            "terminated" | "deleted" => PowerState::Terminated,
            _ => PowerState::Unknown,
        }
    }

    /// Raw string written back when the backend completes a transition.
    pub fn canonical_raw(self) -> &'static str {
        match self {
            PowerState::On => "ACTIVE",
            PowerState::Off => "SHUTOFF",
            PowerState::Suspended => "SUSPENDED",
            PowerState::Paused => "PAUSED",
            PowerState::Shelved => "SHELVED",
            PowerState::Terminated => "DELETED",
            PowerState::Unknown => "UNKNOWN",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PowerState::On => "on",
            PowerState::Off => "off",
            PowerState::Suspended => "suspended",
            PowerState::Paused => "paused",
            PowerState::Shelved => "shelved",
            PowerState::Terminated => "terminated",
            PowerState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
