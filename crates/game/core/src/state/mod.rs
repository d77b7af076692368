//! Mutable game state: actors, timelines, and the spatial grid.
//!
//! These types carry no resolution semantics of their own; all rule logic
//! lives in [`crate::engine`] and mutates state exclusively through the
//! narrow APIs exposed here.
mod actor;
mod common;
mod grid;
mod timeline;

pub use actor::ActorState;
pub use common::{ActorId, ConnectionId, Facing, Fixture, ItemKind, Position, Posture};
pub use grid::{Cell, Grid};
pub use timeline::Timeline;
