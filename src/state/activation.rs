//! The shared activation snapshot and rate arithmetic

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::intent::StepDirection;

/// Lowest accepted rate, clicks per minute
pub const MIN_CPM: u32 = 1;
/// Highest accepted rate, clicks per minute
pub const MAX_CPM: u32 = 3000;
/// Rate used at startup unless configured otherwise
pub const DEFAULT_CPM: u32 = 600;

/// Snapshot of the clicker state, always read and written as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StateRepr")]
pub struct ActivationState {
    pub active: bool,
    rate_cpm: u32,
}

impl ActivationState {
    /// Idle state at the given rate, clamped into range
    pub fn idle(rate_cpm: i64) -> Self {
        Self {
            active: false,
            rate_cpm: clamp_rate(rate_cpm),
        }
    }

    pub fn rate_cpm(&self) -> u32 {
        self.rate_cpm
    }

    /// Store a new rate, clamped. Returns the applied value.
    pub fn set_rate(&mut self, rate_cpm: i64) -> u32 {
        self.rate_cpm = clamp_rate(rate_cpm);
        self.rate_cpm
    }

    /// Delay between two clicks at the current rate
    pub fn interval(&self) -> Duration {
        Duration::from_secs(60) / self.rate_cpm.max(MIN_CPM)
    }
}

impl Default for ActivationState {
    fn default() -> Self {
        Self::idle(DEFAULT_CPM as i64)
    }
}

/// Wire form; the rate is clamped on the way in
#[derive(Deserialize)]
struct StateRepr {
    active: bool,
    rate_cpm: i64,
}

impl From<StateRepr> for ActivationState {
    fn from(repr: StateRepr) -> Self {
        Self {
            active: repr.active,
            rate_cpm: clamp_rate(repr.rate_cpm),
        }
    }
}

fn clamp_rate(rate_cpm: i64) -> u32 {
    rate_cpm.clamp(MIN_CPM as i64, MAX_CPM as i64) as u32
}

/// Increment used by the `<` / `>` controls at a given rate
pub fn step_size(rate_cpm: u32) -> u32 {
    match rate_cpm {
        0..=10 => 1,
        11..=99 => 10,
        100..=999 => 50,
        _ => 100,
    }
}

/// Rate after one step in `direction`, clamped
pub(crate) fn stepped_rate(rate_cpm: u32, direction: StepDirection) -> i64 {
    let step = step_size(rate_cpm) as i64;
    match direction {
        StepDirection::Up => rate_cpm as i64 + step,
        StepDirection::Down => rate_cpm as i64 - step,
    }
}
