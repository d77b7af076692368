//! Thin async shell around the deterministic darkroom engine.
//!
//! A single worker task owns the authoritative [`darkroom_core::Session`];
//! commands arrive over a channel and are handled to completion, so round
//! resolution is atomic with the submission that completed the set and no
//! locking is needed over game state. Transports implement
//! [`SnapshotSink`] to receive per-actor snapshots and the boot signal sent
//! on restart.
pub mod api;
mod handle;
mod runtime;
mod worker;

pub use api::{Result, RuntimeError, SnapshotSink};
pub use handle::SessionHandle;
pub use runtime::{SessionRuntime, SessionRuntimeBuilder};
