//! Core activation state machine
//!
//! Handles transitions between Idle and Clicking and rate updates. Runs on
//! the task that owns the display surface, so every mutation and every
//! surface notification happen in one place.

use std::time::Instant;

use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info};

use crate::events::StateEvent;
use crate::lifecycle::StopSignal;
use crate::surface::DisplaySurface;

use super::activation::{stepped_rate, ActivationState};
use super::intent::{Intent, StepDirection};

/// The two possible states of the clicker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Not clicking
    Idle,
    /// Emission loop is clicking
    Clicking,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Idle => write!(f, "Idle"),
            State::Clicking => write!(f, "Clicking"),
        }
    }
}

/// The state machine that owns `ActivationState`
pub struct ActivationMachine<S> {
    /// Single writer of the shared snapshot
    state_tx: watch::Sender<ActivationState>,
    /// Time when clicking was last switched on
    activated_at: Option<Instant>,
    /// Channel for emitting state events
    event_tx: broadcast::Sender<StateEvent>,
    surface: S,
}

impl<S: DisplaySurface> ActivationMachine<S> {
    /// Create a machine in Idle at `initial_cpm` (clamped)
    pub fn new(initial_cpm: i64, surface: S, event_tx: broadcast::Sender<StateEvent>) -> Self {
        let (state_tx, _state_rx) = watch::channel(ActivationState::idle(initial_cpm));
        Self {
            state_tx,
            activated_at: None,
            event_tx,
            surface,
        }
    }

    /// Get the current state
    pub fn state(&self) -> State {
        if self.snapshot().active {
            State::Clicking
        } else {
            State::Idle
        }
    }

    pub fn snapshot(&self) -> ActivationState {
        *self.state_tx.borrow()
    }

    /// Read-only view of the state for other flows
    pub fn subscribe(&self) -> watch::Receiver<ActivationState> {
        self.state_tx.subscribe()
    }

    #[cfg(test)]
    pub(crate) fn surface(&self) -> &S {
        &self.surface
    }

    /// Run the machine, applying intents until the channel closes or stop fires
    pub async fn run(&mut self, mut intent_rx: mpsc::Receiver<Intent>, stop: StopSignal) {
        info!(
            rate_cpm = self.snapshot().rate_cpm(),
            "activation machine started in Idle state"
        );

        loop {
            tokio::select! {
                biased;
                _ = stop.stopped() => break,
                intent = intent_rx.recv() => match intent {
                    Some(intent) => self.apply(intent),
                    None => break,
                },
            }
        }

        info!("activation machine stopped");
    }

    /// Apply a single intent
    pub fn apply(&mut self, intent: Intent) {
        debug!(?intent, "applying intent");
        match intent {
            Intent::Activate => {
                self.activate();
            }
            Intent::Deactivate => {
                self.deactivate();
            }
            Intent::SetRate { rate_cpm } => {
                self.set_rate(rate_cpm);
            }
            Intent::Step { direction } => {
                self.step(direction);
            }
        }
    }

    /// Idle -> Clicking. Returns false if already clicking.
    pub fn activate(&mut self) -> bool {
        let changed = self.state_tx.send_if_modified(|state| {
            if state.active {
                return false;
            }
            state.active = true;
            true
        });

        if changed {
            self.transition_to(State::Clicking);
        }
        changed
    }

    /// Clicking -> Idle. Returns false if already idle.
    pub fn deactivate(&mut self) -> bool {
        let changed = self.state_tx.send_if_modified(|state| {
            if !state.active {
                return false;
            }
            state.active = false;
            true
        });

        if changed {
            self.transition_to(State::Idle);
        }
        changed
    }

    /// Apply a new rate, clamped. Returns the rate now in effect.
    ///
    /// A click wait already in progress finishes on the old interval.
    pub fn set_rate(&mut self, rate_cpm: i64) -> u32 {
        let mut applied = 0;
        let changed = self.state_tx.send_if_modified(|state| {
            let before = state.rate_cpm();
            applied = state.set_rate(rate_cpm);
            applied != before
        });

        if changed {
            debug!(
                requested = rate_cpm,
                rate_cpm = applied,
                interval_ms = self.snapshot().interval().as_millis() as u64,
                "click rate updated"
            );
            self.surface.on_rate_changed(applied);
            self.emit(StateEvent::RateChanged { rate_cpm: applied });
        }
        applied
    }

    /// Move the rate by one dynamic step
    pub fn step(&mut self, direction: StepDirection) -> u32 {
        let target = stepped_rate(self.snapshot().rate_cpm(), direction);
        self.set_rate(target)
    }

    /// Bookkeeping after the snapshot has been switched
    fn transition_to(&mut self, new_state: State) {
        let rate_cpm = self.snapshot().rate_cpm();
        let active_ms = self
            .activated_at
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        info!(to = %new_state, rate_cpm, "clicker state changed");

        let event = match new_state {
            State::Clicking => {
                self.activated_at = Some(Instant::now());
                StateEvent::Activated { rate_cpm }
            }
            State::Idle => {
                self.activated_at = None;
                StateEvent::Deactivated { active_ms }
            }
        };

        self.surface.on_status_changed(new_state == State::Clicking);
        self.emit(event);
    }

    fn emit(&self, event: StateEvent) {
        debug!(?event, "emitting state event");
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }
}
