//! Cooperative stop signal shared by the background loops
//!
//! Backed by a `watch` channel so async tasks can await it while plain
//! threads poll `is_stopped()` between bounded waits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// Result of a cancellable timed wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full duration elapsed
    TimedOut,
    /// The stop signal fired first
    Cancelled,
}

/// One-shot, cloneable stop flag
#[derive(Debug, Clone)]
pub struct StopSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request every holder of this signal to stop. Idempotent.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `stop()` has been called
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|stopped| *stopped).await;
    }

    /// Sleep for `duration` unless stopped first
    pub async fn wait(&self, duration: Duration) -> WaitOutcome {
        tokio::select! {
            biased;
            _ = self.stopped() => WaitOutcome::Cancelled,
            _ = tokio::time::sleep(duration) => WaitOutcome::TimedOut,
        }
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let stop = StopSignal::new();
        assert_eq!(stop.wait(Duration::from_millis(100)).await, WaitOutcome::TimedOut);
        assert!(!stop.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_cancelled_early() {
        let stop = StopSignal::new();
        let waiter = {
            let stop = stop.clone();
            tokio::spawn(async move {
                let started = tokio::time::Instant::now();
                let outcome = stop.wait(Duration::from_secs(60)).await;
                (outcome, started.elapsed())
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        stop.stop();

        let (outcome, elapsed) = waiter.await.unwrap();
        assert_eq!(outcome, WaitOutcome::Cancelled);
        assert!(elapsed < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_already_stopped_returns_immediately() {
        let stop = StopSignal::new();
        stop.stop();
        stop.stop();
        assert!(stop.is_stopped());
        assert_eq!(stop.wait(Duration::from_secs(3600)).await, WaitOutcome::Cancelled);
    }
}
