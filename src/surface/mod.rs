//! Display surface seam
//!
//! The core never renders anything itself. It notifies a `DisplaySurface`
//! of effective changes and accepts requests back through a
//! `ControlHandle`. The console surface and the stdin command reader are
//! the implementations shipped with the binary.

pub mod commands;
mod console;

use tokio::sync::{mpsc, watch};
use tokio::sync::mpsc::error::TrySendError;

use crate::state::{ActivationState, Intent, StepDirection};

pub use console::ConsoleSurface;

/// Receives state changes to render. Always called from the task that
/// owns the activation machine.
pub trait DisplaySurface: Send {
    /// Clicking was switched on or off
    fn on_status_changed(&mut self, active: bool);

    /// A new (already clamped) rate was applied
    fn on_rate_changed(&mut self, rate_cpm: u32);
}

/// Errors returned when a request cannot be queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("intent queue is full, request dropped")]
    Full,

    #[error("activation machine is no longer running")]
    Closed,
}

/// Cloneable, thread-agnostic access to the machine for a surface.
///
/// Requests are queued without blocking; reads reflect the last state the
/// machine applied, not requests still in flight.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    intent_tx: mpsc::Sender<Intent>,
    state_rx: watch::Receiver<ActivationState>,
}

impl ControlHandle {
    pub fn new(intent_tx: mpsc::Sender<Intent>, state_rx: watch::Receiver<ActivationState>) -> Self {
        Self {
            intent_tx,
            state_rx,
        }
    }

    pub fn activate(&self) -> Result<(), ControlError> {
        self.send(Intent::Activate)
    }

    pub fn deactivate(&self) -> Result<(), ControlError> {
        self.send(Intent::Deactivate)
    }

    pub fn set_rate(&self, rate_cpm: i64) -> Result<(), ControlError> {
        self.send(Intent::SetRate { rate_cpm })
    }

    pub fn step(&self, direction: StepDirection) -> Result<(), ControlError> {
        self.send(Intent::Step { direction })
    }

    pub fn get_rate(&self) -> u32 {
        self.state_rx.borrow().rate_cpm()
    }

    pub fn snapshot(&self) -> ActivationState {
        *self.state_rx.borrow()
    }

    fn send(&self, intent: Intent) -> Result<(), ControlError> {
        self.intent_tx.try_send(intent).map_err(|e| match e {
            TrySendError::Full(_) => ControlError::Full,
            TrySendError::Closed(_) => ControlError::Closed,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_control_queues_intents() {
        let (tx, mut rx) = mpsc::channel(4);
        let (_state_tx, state_rx) = watch::channel(ActivationState::default());
        let control = ControlHandle::new(tx, state_rx);

        assert_ok!(control.activate());
        assert_ok!(control.set_rate(-5));
        assert_ok!(control.step(StepDirection::Up));

        assert_eq!(rx.try_recv().unwrap(), Intent::Activate);
        assert_eq!(rx.try_recv().unwrap(), Intent::SetRate { rate_cpm: -5 });
        assert_eq!(
            rx.try_recv().unwrap(),
            Intent::Step {
                direction: StepDirection::Up
            }
        );
    }

    #[test]
    fn test_control_reports_full_and_closed() {
        let (tx, rx) = mpsc::channel(1);
        let (_state_tx, state_rx) = watch::channel(ActivationState::default());
        let control = ControlHandle::new(tx, state_rx);

        assert_ok!(control.activate());
        assert_eq!(assert_err!(control.deactivate()), ControlError::Full);

        drop(rx);
        assert_eq!(assert_err!(control.deactivate()), ControlError::Closed);
    }

    #[test]
    fn test_control_reads_applied_rate() {
        let (tx, _rx) = mpsc::channel(1);
        let (state_tx, state_rx) = watch::channel(ActivationState::default());
        let control = ControlHandle::new(tx, state_rx);
        assert_eq!(control.get_rate(), 600);

        state_tx.send_modify(|s| {
            s.set_rate(1200);
        });
        assert_eq!(control.get_rate(), 1200);
        assert!(!control.snapshot().active);
    }
}
