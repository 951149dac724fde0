//! Hotkey router thread
//!
//! Owns the input source on a dedicated thread, maps key events to
//! intents and queues them for the activation machine. It never touches
//! the activation state directly.

use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, trace, warn};

use crate::lifecycle::{join_within, StopSignal};
use crate::state::Intent;

use super::keys::{intent_for_key, KeyEvent};
use super::source::{HookError, InputSource};

/// How long `start` waits for the source to report its install result
const INSTALL_TIMEOUT: Duration = Duration::from_secs(2);

/// Running hotkey router. Dropping it without `stop` detaches the thread.
pub struct HotkeyRouter {
    thread: JoinHandle<()>,
    stop: StopSignal,
    join_timeout: Duration,
}

impl HotkeyRouter {
    /// Install `source` on a new thread and start routing.
    ///
    /// Install failures (missing permission, unsupported platform) are
    /// returned here; the caller decides whether to continue without
    /// hotkeys.
    pub fn start<S: InputSource>(
        mut source: S,
        intent_tx: mpsc::Sender<Intent>,
        poll_interval: Duration,
        join_timeout: Duration,
    ) -> Result<Self, HookError> {
        let stop = StopSignal::new();
        let thread_stop = stop.clone();
        let (ready_tx, ready_rx) = std_mpsc::sync_channel::<Result<(), HookError>>(1);

        let thread = thread::Builder::new()
            .name("hotkey-router".to_string())
            .spawn(move || {
                let (key_tx, key_rx) = std_mpsc::channel::<KeyEvent>();
                let on_key = Box::new(move |event: KeyEvent| {
                    let _ = key_tx.send(event);
                });

                let handle = match source.install(on_key) {
                    Ok(handle) => handle,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                info!("hotkey router started");
                route_keys(&key_rx, &intent_tx, &thread_stop, poll_interval);

                source.uninstall(handle);
                info!("hotkey router stopped");
            })
            .map_err(|e| HookError::ThreadSpawn(e.to_string()))?;

        match ready_rx.recv_timeout(INSTALL_TIMEOUT) {
            Ok(Ok(())) => Ok(Self {
                thread,
                stop,
                join_timeout,
            }),
            Ok(Err(e)) => {
                // The thread returns right after reporting the failure.
                let _ = join_within(thread, join_timeout, "hotkey router");
                Err(e)
            }
            Err(RecvTimeoutError::Timeout) => {
                stop.stop();
                Err(HookError::InstallFailed(format!(
                    "no install result within {INSTALL_TIMEOUT:?}"
                )))
            }
            Err(RecvTimeoutError::Disconnected) => Err(HookError::InstallFailed(
                "router thread exited during install".to_string(),
            )),
        }
    }

    /// Check if the router thread is still running
    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }

    /// Stop routing, uninstall the hook and join the thread.
    ///
    /// A join that overruns the timeout is logged and the thread detached.
    pub fn stop(self) {
        self.stop.stop();
        match join_within(self.thread, self.join_timeout, "hotkey router") {
            Ok(()) => debug!("hotkey router joined"),
            Err(e) => warn!(error = %e, "detaching hotkey router"),
        }
    }
}

/// Forward mapped intents until stopped or either side goes away
fn route_keys(
    key_rx: &std_mpsc::Receiver<KeyEvent>,
    intent_tx: &mpsc::Sender<Intent>,
    stop: &StopSignal,
    poll_interval: Duration,
) {
    while !stop.is_stopped() {
        let event = match key_rx.recv_timeout(poll_interval) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("input source stopped delivering key events");
                break;
            }
        };

        let Some(intent) = intent_for_key(&event) else {
            trace!(?event, "ignoring key");
            continue;
        };

        debug!(?event, ?intent, "hotkey pressed");
        match intent_tx.try_send(intent) {
            Ok(()) => {}
            Err(TrySendError::Full(intent)) => {
                warn!(?intent, "intent queue full, dropping hotkey");
            }
            Err(TrySendError::Closed(_)) => {
                info!("activation machine gone, hotkey router exiting");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkey::source::KeyCallback;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    const POLL: Duration = Duration::from_millis(20);
    const JOIN: Duration = Duration::from_secs(1);

    /// Source whose callback the test can drive directly
    #[derive(Clone, Default)]
    struct FakeSource {
        callback: Arc<Mutex<Option<KeyCallback>>>,
        installs: Arc<AtomicUsize>,
        uninstalled: Arc<AtomicBool>,
        refuse: bool,
    }

    impl FakeSource {
        fn refusing() -> Self {
            Self {
                refuse: true,
                ..Self::default()
            }
        }

        fn press(&self, ch: char) {
            let mut callback = self.callback.lock().unwrap();
            let callback = callback.as_mut().expect("source not installed");
            callback(KeyEvent::Char(ch));
        }
    }

    impl InputSource for FakeSource {
        type Handle = ();

        fn install(&mut self, on_key: KeyCallback) -> Result<(), HookError> {
            self.installs.fetch_add(1, Ordering::SeqCst);
            if self.refuse {
                return Err(HookError::PermissionDenied);
            }
            *self.callback.lock().unwrap() = Some(on_key);
            Ok(())
        }

        fn uninstall(&mut self, _handle: ()) {
            self.callback.lock().unwrap().take();
            self.uninstalled.store(true, Ordering::SeqCst);
        }
    }

    fn recv_within(rx: &mut mpsc::Receiver<Intent>, timeout: Duration) -> Option<Intent> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(intent) = rx.try_recv() {
                return Some(intent);
            }
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_routes_hotkeys_to_intents() {
        let source = FakeSource::default();
        let (tx, mut rx) = mpsc::channel(16);
        let router = HotkeyRouter::start(source.clone(), tx, POLL, JOIN).unwrap();
        assert!(router.is_running());

        for ch in [']', 'a', '+', '[', 'x', '-'] {
            source.press(ch);
        }

        let timeout = Duration::from_secs(1);
        assert_eq!(recv_within(&mut rx, timeout), Some(Intent::Activate));
        assert_eq!(recv_within(&mut rx, timeout), Some(Intent::Activate));
        assert_eq!(recv_within(&mut rx, timeout), Some(Intent::Deactivate));
        assert_eq!(recv_within(&mut rx, timeout), Some(Intent::Deactivate));
        assert_eq!(recv_within(&mut rx, Duration::from_millis(100)), None);

        router.stop();
    }

    #[test]
    fn test_install_failure_is_reported() {
        let (tx, _rx) = mpsc::channel(16);
        let result = HotkeyRouter::start(FakeSource::refusing(), tx, POLL, JOIN);
        assert!(matches!(result, Err(HookError::PermissionDenied)));
    }

    #[test]
    fn test_stop_uninstalls_and_joins() {
        let source = FakeSource::default();
        let (tx, _rx) = mpsc::channel(16);
        let router = HotkeyRouter::start(source.clone(), tx, POLL, JOIN).unwrap();

        let started = Instant::now();
        router.stop();
        assert!(started.elapsed() < JOIN);
        assert!(source.uninstalled.load(Ordering::SeqCst));
        assert_eq!(source.installs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_refused_install_is_not_retried() {
        let source = FakeSource::refusing();
        let (tx, _rx) = mpsc::channel(16);
        assert!(HotkeyRouter::start(source.clone(), tx, POLL, JOIN).is_err());

        thread::sleep(POLL * 2);
        assert_eq!(source.installs.load(Ordering::SeqCst), 1);
        assert!(!source.uninstalled.load(Ordering::SeqCst));
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let source = FakeSource::default();
        let (tx, mut rx) = mpsc::channel(1);
        let router = HotkeyRouter::start(source.clone(), tx, POLL, JOIN).unwrap();

        for _ in 0..5 {
            source.press(']');
        }
        thread::sleep(Duration::from_millis(100));
        assert!(router.is_running());

        assert_eq!(rx.try_recv().ok(), Some(Intent::Activate));
        source.press('[');
        assert_eq!(recv_within(&mut rx, Duration::from_secs(1)), Some(Intent::Deactivate));

        router.stop();
    }

    #[test]
    fn test_exits_when_machine_gone() {
        let source = FakeSource::default();
        let (tx, rx) = mpsc::channel(4);
        let router = HotkeyRouter::start(source.clone(), tx, POLL, JOIN).unwrap();

        drop(rx);
        source.press(']');

        let deadline = Instant::now() + JOIN;
        while router.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!router.is_running());
        assert!(source.uninstalled.load(Ordering::SeqCst));
    }
}
