//! milky-clicks: hotkey-toggled auto clicker
//!
//! Runs three flows of control:
//! - The activation machine, owned by the main task together with the
//!   display surface, so state changes and rendering happen in one place
//! - The click emission loop, a tokio task reading state snapshots
//! - The hotkey router, a dedicated thread on top of the OS key hook
//!
//! Global hotkeys: `]` or `+` starts clicking, `[` or `-` stops it.
//! Without hotkey support the same controls are available on stdin.

mod clicker;
mod config;
mod events;
mod hotkey;
mod lifecycle;
mod state;
mod surface;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::clicker::{platform_actuator, EmissionLoop};
use crate::config::Config;
use crate::events::StateEvent;
use crate::hotkey::{platform_source, HotkeyRouter};
use crate::lifecycle::{ShutdownSignal, StopSignal};
use crate::state::{ActivationMachine, ActivationState};
use crate::surface::{commands, ConsoleSurface, ControlHandle};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "milky-clicks starting"
    );

    // Load configuration
    let config = Config::load()?;
    info!(?config, "configuration loaded");

    let shutdown = ShutdownSignal::new();
    let stop = StopSignal::new();

    // Create channels for inter-component communication
    // Hotkey router and console -> activation machine
    let (intent_tx, intent_rx) = mpsc::channel(config.intent_capacity);
    // Activation machine -> observers
    let (event_tx, mut event_rx) = broadcast::channel::<StateEvent>(64);

    // Create the activation machine; it owns the display surface
    let initial = ActivationState::idle(config.initial_cpm);
    let surface = ConsoleSurface::new(initial.rate_cpm());
    let mut machine = ActivationMachine::new(config.initial_cpm, surface, event_tx);

    // Start the emission loop
    let emitter = EmissionLoop::new(
        platform_actuator(),
        machine.subscribe(),
        stop.clone(),
        config.poll_interval,
    )
    .spawn();

    // Start the hotkey router (runs on dedicated thread)
    let router = if config.hotkeys_enabled {
        match HotkeyRouter::start(
            platform_source(),
            intent_tx.clone(),
            config.poll_interval,
            config.shutdown_timeout,
        ) {
            Ok(router) => {
                info!("hotkeys active: ']' or '+' to activate, '[' or '-' to deactivate");
                Some(router)
            }
            Err(e) => {
                error!(error = %e, "failed to start hotkey router");
                warn!("continuing without hotkeys - use console commands instead");
                None
            }
        }
    } else {
        info!("hotkeys disabled by configuration");
        None
    };

    // Manual control from the console. Main keeps its own sender so stdin
    // EOF ends the reader only, never the intent queue.
    let control = ControlHandle::new(intent_tx.clone(), machine.subscribe());
    if let Err(e) = commands::spawn_reader(control, stop.clone()) {
        warn!(?e, "console commands unavailable");
    }

    info!("initialized, waiting for activation (type `help` for commands)");

    // Main event loop
    tokio::select! {
        // Apply intents from the router and the console
        _ = machine.run(intent_rx, stop.clone()) => {
            info!("activation machine exited");
        }

        // Follow state events
        _ = async {
            loop {
                match event_rx.recv().await {
                    Ok(event) => debug!(%event, "state event"),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "state event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("state event handler exited");
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }

        // `quit` from the console
        _ = stop.stopped() => {
            info!("stop requested");
        }
    }

    // Cleanup
    info!("shutting down...");
    stop.stop();
    drop(intent_tx);

    if let Some(router) = router {
        if let Err(e) = tokio::task::spawn_blocking(move || router.stop()).await {
            warn!(?e, "hotkey router shutdown task failed");
        }
    }

    debug!(clicks = emitter.clicks(), "stopping emission loop");
    match emitter.shutdown(config.shutdown_timeout).await {
        Ok(clicks) => info!(clicks, "emission loop stopped"),
        Err(e) => warn!(error = %e, "emission loop did not stop cleanly"),
    }

    info!("milky-clicks stopped");

    Ok(())
}
