//! Click emission
//!
//! A cancellable periodic task that reads the activation snapshot and
//! drives a `PointerActuator` while clicking is switched on.

mod actuator;
mod emitter;
#[cfg(target_os = "macos")]
mod macos;

pub use actuator::platform_actuator;
pub use emitter::EmissionLoop;
