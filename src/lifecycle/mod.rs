//! Process lifecycle: OS shutdown signals, the shared stop signal
//! observed by every background loop, and bounded thread joins.

mod join;
mod shutdown;
mod stop;

pub use join::{join_within, LifecycleError};
pub use shutdown::ShutdownSignal;
pub use stop::{StopSignal, WaitOutcome};
