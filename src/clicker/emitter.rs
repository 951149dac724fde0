//! The click emission loop
//!
//! Each cycle reads the activation snapshot once. While clicking it fires
//! one actuation, then waits out the click interval. Deactivation and the
//! stop signal cut that wait short; a rate change does not, the new
//! interval is picked up on the next cycle. While idle it waits for a
//! state change or the poll interval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::lifecycle::{LifecycleError, StopSignal, WaitOutcome};
use crate::state::ActivationState;

use super::actuator::PointerActuator;

/// Why a wait inside the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    Elapsed,
    StateChanged,
    Stopped,
}

pub struct EmissionLoop<A> {
    actuator: A,
    state_rx: watch::Receiver<ActivationState>,
    stop: StopSignal,
    poll_interval: Duration,
    clicks: Arc<AtomicU64>,
    /// Consecutive failed actuations
    failure_streak: u64,
}

impl<A: PointerActuator> EmissionLoop<A> {
    pub fn new(
        actuator: A,
        state_rx: watch::Receiver<ActivationState>,
        stop: StopSignal,
        poll_interval: Duration,
    ) -> Self {
        Self {
            actuator,
            state_rx,
            stop,
            poll_interval,
            clicks: Arc::new(AtomicU64::new(0)),
            failure_streak: 0,
        }
    }

    /// Run the loop on the tokio runtime
    pub fn spawn(self) -> EmissionHandle {
        let clicks = Arc::clone(&self.clicks);
        let task = tokio::spawn(self.run());
        EmissionHandle { task, clicks }
    }

    /// Loop until the stop signal fires or the state owner goes away
    pub async fn run(mut self) {
        info!(poll_ms = self.poll_interval.as_millis() as u64, "emission loop started");

        while !self.stop.is_stopped() {
            let snapshot = *self.state_rx.borrow_and_update();

            let wake = if snapshot.active {
                self.actuate();
                let deadline = Instant::now() + snapshot.interval();
                self.wait_click_interval(deadline).await
            } else {
                self.wait_idle().await
            };

            if wake == Wake::Stopped {
                break;
            }
        }

        info!(
            clicks = self.clicks.load(Ordering::Relaxed),
            "emission loop finished"
        );
    }

    fn actuate(&mut self) {
        match self.actuator.emit_click() {
            Ok(()) => {
                self.clicks.fetch_add(1, Ordering::Relaxed);
                if self.failure_streak > 0 {
                    info!(failed = self.failure_streak, "click actuation recovered");
                    self.failure_streak = 0;
                }
            }
            Err(e) => {
                self.failure_streak += 1;
                if self.failure_streak == 1 {
                    warn!(error = %e, "click actuation failed");
                } else {
                    debug!(error = %e, streak = self.failure_streak, "click actuation failed");
                }
            }
        }
    }

    /// Wait until `deadline` unless deactivated or stopped first
    async fn wait_click_interval(&mut self, deadline: Instant) -> Wake {
        loop {
            tokio::select! {
                biased;
                _ = self.stop.stopped() => return Wake::Stopped,
                _ = tokio::time::sleep_until(deadline) => return Wake::Elapsed,
                changed = self.state_rx.changed() => {
                    if changed.is_err() {
                        return Wake::Stopped;
                    }
                    if !self.state_rx.borrow().active {
                        return Wake::StateChanged;
                    }
                    // Rate-only change, keep the current deadline.
                }
            }
        }
    }

    async fn wait_idle(&mut self) -> Wake {
        tokio::select! {
            biased;
            outcome = self.stop.wait(self.poll_interval) => match outcome {
                WaitOutcome::Cancelled => Wake::Stopped,
                WaitOutcome::TimedOut => Wake::Elapsed,
            },
            changed = self.state_rx.changed() => {
                if changed.is_err() {
                    Wake::Stopped
                } else {
                    Wake::StateChanged
                }
            }
        }
    }
}

/// Handle to a spawned emission loop
pub struct EmissionHandle {
    task: JoinHandle<()>,
    clicks: Arc<AtomicU64>,
}

impl EmissionHandle {
    /// Successful actuations so far
    pub fn clicks(&self) -> u64 {
        self.clicks.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait up to `timeout` for the loop to exit after the stop signal has
    /// been raised. The task is aborted if it overruns.
    pub async fn shutdown(self, timeout: Duration) -> Result<u64, LifecycleError> {
        let mut task = self.task;
        match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(?e, "emission loop task failed"),
            Err(_) => {
                task.abort();
                return Err(LifecycleError::ShutdownTimeout {
                    task: "emission loop",
                    timeout,
                });
            }
        }
        Ok(self.clicks.load(Ordering::Relaxed))
    }
}
