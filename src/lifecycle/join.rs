//! Bounded joins for plain OS threads

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::warn;

const JOIN_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("{task} did not stop within {timeout:?}")]
    ShutdownTimeout {
        task: &'static str,
        timeout: Duration,
    },
}

/// Join `handle`, giving up after `timeout`.
///
/// On timeout the thread is detached and keeps running until process exit.
pub fn join_within(
    handle: JoinHandle<()>,
    timeout: Duration,
    task: &'static str,
) -> Result<(), LifecycleError> {
    let deadline = Instant::now() + timeout;

    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return Err(LifecycleError::ShutdownTimeout { task, timeout });
        }
        std::thread::sleep(JOIN_POLL);
    }

    if handle.join().is_err() {
        warn!(task, "thread panicked before shutdown");
    }
    Ok(())
}
