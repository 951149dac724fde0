//! Requests to change the activation state

use serde::{Deserialize, Serialize};

/// Direction for the dynamic-step rate controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDirection {
    Up,
    Down,
}

/// A single state change request, consumed once by the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// Start clicking (no-op while already clicking)
    Activate,
    /// Stop clicking (no-op while idle)
    Deactivate,
    /// Change the rate; out-of-range values are clamped
    SetRate { rate_cpm: i64 },
    /// Move the rate by one dynamic step
    Step { direction: StepDirection },
}
