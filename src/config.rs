//! Configuration loading and management
//!
//! Everything has an in-memory default; a few environment variables can
//! override them at launch. Nothing is persisted.

use std::time::Duration;

use anyhow::{bail, ensure, Context, Result};

use crate::state::DEFAULT_CPM;

const ENV_CPM: &str = "MILKY_CLICKS_CPM";
const ENV_HOTKEYS: &str = "MILKY_CLICKS_HOTKEYS";
const ENV_POLL_MS: &str = "MILKY_CLICKS_POLL_MS";
const ENV_SHUTDOWN_MS: &str = "MILKY_CLICKS_SHUTDOWN_MS";

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Rate at startup; clamped by the activation machine
    pub initial_cpm: i64,

    /// Install the global hotkey hook
    pub hotkeys_enabled: bool,

    /// Idle poll interval of the background loops
    pub poll_interval: Duration,

    /// Upper bound on each join during shutdown
    pub shutdown_timeout: Duration,

    /// Capacity of the intent queue into the activation machine
    pub intent_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_cpm: DEFAULT_CPM as i64,
            hotkeys_enabled: true,
            poll_interval: Duration::from_millis(100),
            shutdown_timeout: Duration::from_secs(1),
            intent_capacity: 32,
        }
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_CPM) {
            config.initial_cpm = value
                .trim()
                .parse()
                .with_context(|| format!("{ENV_CPM} must be a whole number, got `{value}`"))?;
        }

        if let Some(value) = lookup(ENV_HOTKEYS) {
            config.hotkeys_enabled =
                parse_flag(&value).with_context(|| format!("invalid {ENV_HOTKEYS}"))?;
        }

        if let Some(value) = lookup(ENV_POLL_MS) {
            let ms = parse_millis(ENV_POLL_MS, &value)?;
            ensure!(
                (10..=200).contains(&ms),
                "{ENV_POLL_MS} must be between 10 and 200, got {ms}"
            );
            config.poll_interval = Duration::from_millis(ms);
        }

        if let Some(value) = lookup(ENV_SHUTDOWN_MS) {
            let ms = parse_millis(ENV_SHUTDOWN_MS, &value)?;
            ensure!(ms > 0, "{ENV_SHUTDOWN_MS} must be positive");
            config.shutdown_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn parse_millis(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a number of milliseconds, got `{value}`"))
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("expected a boolean, got `{other}`"),
    }
}
