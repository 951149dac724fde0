//! Events module for activation state transitions
//!
//! Broadcast by the activation machine after each effective change so
//! observers (logging, future front-ends) can follow along without
//! touching the state itself.

use serde::{Deserialize, Serialize};

/// Events emitted by the activation machine during transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateEvent {
    /// Clicking started
    Activated {
        /// Rate in effect when clicking started
        rate_cpm: u32,
    },

    /// Clicking stopped
    Deactivated {
        /// Duration in milliseconds that clicking was active
        active_ms: u64,
    },

    /// Click rate changed
    RateChanged {
        /// Newly applied rate, already clamped
        rate_cpm: u32,
    },
}

impl std::fmt::Display for StateEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateEvent::Activated { rate_cpm } => write!(f, "ACTIVATED ({} CPM)", rate_cpm),
            StateEvent::Deactivated { active_ms } => {
                write!(f, "DEACTIVATED ({}ms)", active_ms)
            }
            StateEvent::RateChanged { rate_cpm } => write!(f, "RATE_CHANGED ({} CPM)", rate_cpm),
        }
    }
}
