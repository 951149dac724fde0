//! Synthetic click backends

/// Emits one left-button click at the current cursor position
pub trait PointerActuator: Send + 'static {
    fn emit_click(&mut self) -> Result<(), ActuationError>;
}

impl<A: PointerActuator + ?Sized> PointerActuator for Box<A> {
    fn emit_click(&mut self) -> Result<(), ActuationError> {
        (**self).emit_click()
    }
}

/// Errors from a single click attempt. Never fatal to the emission loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActuationError {
    #[error("failed to create event source - check Accessibility permissions")]
    EventSource,

    #[error("failed to create mouse event")]
    EventCreation,

    #[error("synthetic clicks are not supported on this platform")]
    Unsupported,
}

/// Actuator for platforms without a click backend
#[cfg(not(target_os = "macos"))]
struct UnsupportedActuator;

#[cfg(not(target_os = "macos"))]
impl PointerActuator for UnsupportedActuator {
    fn emit_click(&mut self) -> Result<(), ActuationError> {
        Err(ActuationError::Unsupported)
    }
}

/// The click backend for the current platform
#[cfg(target_os = "macos")]
pub fn platform_actuator() -> Box<dyn PointerActuator> {
    Box::new(super::macos::CoreGraphicsActuator::new())
}

/// The click backend for the current platform
#[cfg(not(target_os = "macos"))]
pub fn platform_actuator() -> Box<dyn PointerActuator> {
    Box::new(UnsupportedActuator)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;

    use super::{ActuationError, PointerActuator};

    /// Counts attempts and successful clicks; can be switched to failing
    #[derive(Debug, Clone, Default)]
    pub struct CountingActuator {
        pub attempts: Arc<AtomicU64>,
        pub clicks: Arc<AtomicU64>,
        pub failing: Arc<AtomicBool>,
    }

    impl CountingActuator {
        pub fn failing() -> Self {
            let actuator = Self::default();
            actuator.failing.store(true, Ordering::SeqCst);
            actuator
        }

        pub fn attempts(&self) -> u64 {
            self.attempts.load(Ordering::SeqCst)
        }

        pub fn clicks(&self) -> u64 {
            self.clicks.load(Ordering::SeqCst)
        }
    }

    impl PointerActuator for CountingActuator {
        fn emit_click(&mut self) -> Result<(), ActuationError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(ActuationError::EventCreation);
            }
            self.clicks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}

#[cfg(all(test, not(target_os = "macos")))]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_fails_each_click() {
        let mut actuator = platform_actuator();
        assert_eq!(actuator.emit_click(), Err(ActuationError::Unsupported));
        assert_eq!(actuator.emit_click(), Err(ActuationError::Unsupported));
    }
}
