//! Input source seam for the OS keyboard hook

use super::keys::KeyEvent;

/// Called with every key-down event, on the source's own thread
pub type KeyCallback = Box<dyn FnMut(KeyEvent) + Send + 'static>;

/// A global keyboard hook
pub trait InputSource: Send + 'static {
    /// Token returned by `install`, handed back to `uninstall`
    type Handle: Send;

    /// Start delivering key-down events to `on_key`
    fn install(&mut self, on_key: KeyCallback) -> Result<Self::Handle, HookError>;

    /// Stop delivery and release the hook
    fn uninstall(&mut self, handle: Self::Handle);
}

/// Errors that can occur while installing or running the hotkey hook
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("keyboard hook refused - check Accessibility permissions")]
    PermissionDenied,

    #[error("failed to install keyboard hook: {0}")]
    InstallFailed(String),

    #[error("global hotkeys are not supported on this platform")]
    Unsupported,

    #[error("failed to spawn hook thread: {0}")]
    ThreadSpawn(String),
}

#[cfg(target_os = "macos")]
pub type PlatformSource = super::macos::EventTapSource;

#[cfg(not(target_os = "macos"))]
pub type PlatformSource = UnsupportedSource;

/// The keyboard hook for the current platform
pub fn platform_source() -> PlatformSource {
    PlatformSource::new()
}

/// Source for platforms without a keyboard hook; install always fails
#[cfg(not(target_os = "macos"))]
pub struct UnsupportedSource;

#[cfg(not(target_os = "macos"))]
impl UnsupportedSource {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(target_os = "macos"))]
impl InputSource for UnsupportedSource {
    type Handle = ();

    fn install(&mut self, _on_key: KeyCallback) -> Result<(), HookError> {
        Err(HookError::Unsupported)
    }

    fn uninstall(&mut self, _handle: ()) {}
}
