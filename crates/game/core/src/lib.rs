//! Deterministic engine for a turn-based hidden-grid exploration game.
//!
//! `darkroom-core` owns the canonical rules: the grid and actor state, the
//! lobby/active/over session state machine, simultaneous round resolution,
//! and the weighted collision outcome table. It is free of async, I/O, and
//! transport types; the runtime crate wraps a [`engine::Session`] and moves
//! snapshots across the wire. All randomness flows through the injected
//! [`rng::OutcomeSource`], so seeded games replay deterministically.
pub mod action;
pub mod config;
pub mod engine;
pub mod rng;
pub mod snapshot;
pub mod state;

pub use action::ActionKind;
pub use config::GameConfig;
pub use engine::{EngineError, JoinOutcome, Phase, Session, SubmitOutcome};
pub use rng::{OutcomeSource, PcgSource};
pub use snapshot::StateSnapshot;
pub use state::{
    ActorId, ActorState, Cell, ConnectionId, Facing, Fixture, Grid, ItemKind, Position, Posture,
    Timeline,
};
