//! Hotkey module for global keyboard shortcuts
//!
//! An `InputSource` delivers raw key-down events; the `HotkeyRouter`
//! turns the activation keys into intents and queues them for the
//! activation machine. On macOS the source is a listen-only CGEventTap.

mod keys;
#[cfg(target_os = "macos")]
mod macos;
mod router;
mod source;

pub use router::HotkeyRouter;
pub use source::platform_source;
