//! Global key hook using macOS CGEventTap
//!
//! Monitors system-wide key-down events. Runs on its own thread with its
//! own CFRunLoop, polled in short slices so uninstall is prompt.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use core_foundation::runloop::{kCFRunLoopCommonModes, kCFRunLoopDefaultMode, CFRunLoop};
use core_graphics::event::{
    CGEvent, CGEventFlags, CGEventTap, CGEventTapLocation, CGEventTapOptions,
    CGEventTapPlacement, CGEventType, EventField,
};
use tracing::{error, info, warn};

use crate::lifecycle::join_within;

use super::keys::KeyEvent;
use super::source::{HookError, InputSource, KeyCallback};

const RUN_LOOP_SLICE: Duration = Duration::from_millis(100);
const TAP_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Listen-only event tap on key-down events
pub struct EventTapSource;

impl EventTapSource {
    pub fn new() -> Self {
        Self
    }
}

/// An installed tap: the run-loop thread and its keep-running flag
pub struct TapHandle {
    running: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl InputSource for EventTapSource {
    type Handle = TapHandle;

    fn install(&mut self, on_key: KeyCallback) -> Result<TapHandle, HookError> {
        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel(1);

        let thread_running = Arc::clone(&running);
        let thread = thread::Builder::new()
            .name("event-tap".to_string())
            .spawn(move || {
                run_event_loop(on_key, &thread_running, ready_tx);
                info!("event tap thread stopped");
            })
            .map_err(|e| HookError::ThreadSpawn(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(TapHandle { running, thread }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(HookError::InstallFailed(
                "event tap thread exited during setup".to_string(),
            )),
        }
    }

    fn uninstall(&mut self, handle: TapHandle) {
        handle.running.store(false, Ordering::SeqCst);
        if let Err(e) = join_within(handle.thread, TAP_JOIN_TIMEOUT, "event tap") {
            warn!(error = %e, "detaching event tap thread");
        }
    }
}

/// Create the tap, report the outcome, then pump the run loop until told to stop
fn run_event_loop(
    mut on_key: KeyCallback,
    running: &AtomicBool,
    ready_tx: SyncSender<Result<(), HookError>>,
) {
    // The tap callback must be fast and non-blocking; events are handed off here.
    let (callback_tx, callback_rx) = std::sync::mpsc::channel::<KeyEvent>();

    let callback = move |_proxy: core_graphics::event::CGEventTapProxy,
                         event_type: CGEventType,
                         event: &CGEvent|
                         -> Option<CGEvent> {
        match event_type {
            CGEventType::KeyDown => {
                let code = event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u16;
                let shift = event.get_flags().contains(CGEventFlags::CGEventFlagShift);
                let _ = callback_tx.send(KeyEvent::from_keycode(code, shift));
            }
            CGEventType::TapDisabledByTimeout | CGEventType::TapDisabledByUserInput => {
                warn!("event tap disabled by the system, hotkeys may be missed");
            }
            _ => {}
        }
        Some(event.clone())
    };

    let tap = match CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::ListenOnly,
        vec![CGEventType::KeyDown],
        callback,
    ) {
        Ok(tap) => tap,
        Err(()) => {
            error!("failed to create event tap - is Accessibility permission granted?");
            let _ = ready_tx.send(Err(HookError::PermissionDenied));
            return;
        }
    };

    let run_loop_source = match tap.mach_port.create_runloop_source(0) {
        Ok(source) => source,
        Err(()) => {
            let _ = ready_tx.send(Err(HookError::InstallFailed(
                "failed to create run loop source".to_string(),
            )));
            return;
        }
    };

    let run_loop = CFRunLoop::get_current();
    unsafe {
        run_loop.add_source(&run_loop_source, kCFRunLoopCommonModes);
    }
    tap.enable();

    info!("event tap created and enabled");
    let _ = ready_tx.send(Ok(()));

    while running.load(Ordering::SeqCst) {
        unsafe {
            CFRunLoop::run_in_mode(kCFRunLoopDefaultMode, RUN_LOOP_SLICE, true);
        }

        while let Ok(event) = callback_rx.try_recv() {
            on_key(event);
        }
    }

    // Tap and source are released when they go out of scope
}
