//! Public API surface: unified errors and the transport-facing capability.
mod errors;
mod sink;

pub use errors::{Result, RuntimeError};
pub use sink::SnapshotSink;
