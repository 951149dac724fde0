//! Activation state and the machine that owns it
//!
//! Two states:
//! - Idle: no clicks are emitted
//! - Clicking: the emission loop clicks at `rate_cpm`
//!
//! The machine is the only writer. Other flows read whole-value
//! snapshots through a `watch` channel and request changes with `Intent`s.

mod activation;
mod intent;
mod machine;

pub use activation::{ActivationState, DEFAULT_CPM, MAX_CPM, MIN_CPM};
pub use intent::{Intent, StepDirection};
pub use machine::ActivationMachine;
