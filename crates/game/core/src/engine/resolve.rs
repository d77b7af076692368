//! Per-action resolution rules.
//!
//! Each pending action maps to exactly one mutation, recorded as
//! human-readable events on the acting (and, for collisions, the suffering)
//! actor's timeline. Blocked movement never fails the round; it rolls an
//! outcome from the collision table instead.

use std::collections::BTreeMap;

use crate::action::ActionKind;
use crate::config::GameConfig;
use crate::rng::OutcomeSource;
use crate::state::{ActorId, ActorState, Cell, Grid, ItemKind, Posture};

use super::EngineError;

/// What blocks a movement, if anything.
enum Obstacle {
    None,
    Wall,
    Occupant(ActorId),
}

pub(super) fn resolve_action(
    actor_id: ActorId,
    kind: ActionKind,
    actors: &mut BTreeMap<ActorId, ActorState>,
    grid: &mut Grid,
    rng: &mut dyn OutcomeSource,
) -> Result<(), EngineError> {
    match kind {
        ActionKind::DoNothing => {
            actor_mut(actors, actor_id)?.timeline.record("you did nothing");
            Ok(())
        }
        ActionKind::TurnLeft => {
            let actor = actor_mut(actors, actor_id)?;
            actor.rotate_left();
            actor.timeline.record("you turned left");
            Ok(())
        }
        ActionKind::TurnRight => {
            let actor = actor_mut(actors, actor_id)?;
            actor.rotate_right();
            actor.timeline.record("you turned right");
            Ok(())
        }
        ActionKind::MoveForward => resolve_move(actor_id, true, actors, grid, rng),
        ActionKind::MoveBackward => resolve_move(actor_id, false, actors, grid, rng),
        ActionKind::StandUp => {
            let actor = actor_mut(actors, actor_id)?;
            actor.posture = Posture::Standing;
            actor.timeline.record("you stood up");
            Ok(())
        }
        ActionKind::CrouchDown => {
            let position = grid
                .locate(actor_id)
                .ok_or(EngineError::ActorNotPlaced(actor_id))?;
            let actor = actor_mut(actors, actor_id)?;
            actor.posture = Posture::Crouched;
            actor.timeline.record("you crouched down");
            if let Some(cell) = grid.cell_mut(position) {
                pick_up_items(actor, cell);
            }
            Ok(())
        }
        ActionKind::ReachForward => resolve_reach(actor_id, actors, grid),
    }
}

fn resolve_move(
    actor_id: ActorId,
    forward: bool,
    actors: &mut BTreeMap<ActorId, ActorState>,
    grid: &mut Grid,
    rng: &mut dyn OutcomeSource,
) -> Result<(), EngineError> {
    let origin = grid
        .locate(actor_id)
        .ok_or(EngineError::ActorNotPlaced(actor_id))?;
    let facing = actor_mut(actors, actor_id)?.facing;
    let destination = Grid::step(origin, facing, forward);

    let obstacle = match grid.cell(destination) {
        None => Obstacle::Wall,
        // An unopened door blocks movement exactly like a wall.
        Some(cell) if cell.has_door() => Obstacle::Wall,
        Some(cell) => match cell.occupant {
            Some(other) => Obstacle::Occupant(other),
            None => Obstacle::None,
        },
    };

    match obstacle {
        Obstacle::None => {
            grid.move_occupant(origin, destination);
            let event = if forward {
                "you stepped forward"
            } else {
                "you stepped backward"
            };
            actor_mut(actors, actor_id)?.timeline.record(event);
        }
        Obstacle::Wall => {
            actor_mut(actors, actor_id)?
                .timeline
                .record("you collided with a wall");
            apply_collision_outcome(actor_id, actors, grid, rng)?;
        }
        Obstacle::Occupant(other) => {
            // Initiator suffers its outcome first, then the recipient.
            actor_mut(actors, actor_id)?
                .timeline
                .record("you collided with another player");
            apply_collision_outcome(actor_id, actors, grid, rng)?;
            actor_mut(actors, other)?
                .timeline
                .record("another player collided with you");
            apply_collision_outcome(other, actors, grid, rng)?;
        }
    }

    Ok(())
}

/// Rolls one outcome from the weighted collision table and applies it. The
/// same table covers walls, other actors, and closed doors.
fn apply_collision_outcome(
    actor_id: ActorId,
    actors: &mut BTreeMap<ActorId, ActorState>,
    grid: &mut Grid,
    rng: &mut dyn OutcomeSource,
) -> Result<(), EngineError> {
    match rng.weighted_index(&GameConfig::COLLISION_WEIGHTS) {
        // nothing
        0 => {}
        // disoriented: one extra draw picks the turn direction
        1 => {
            let actor = actor_mut(actors, actor_id)?;
            if rng.next_bool() {
                actor.rotate_right();
            } else {
                actor.rotate_left();
            }
            actor.timeline.record("you got disoriented");
        }
        // tripped: relocation is a no-op in a sealed corner
        _ => {
            actor_mut(actors, actor_id)?.timeline.record("you tripped");
            grid.relocate_to_nearby_empty(actor_id, rng);
        }
    }
    Ok(())
}

fn resolve_reach(
    actor_id: ActorId,
    actors: &mut BTreeMap<ActorId, ActorState>,
    grid: &mut Grid,
) -> Result<(), EngineError> {
    let origin = grid
        .locate(actor_id)
        .ok_or(EngineError::ActorNotPlaced(actor_id))?;
    let actor = actor_mut(actors, actor_id)?;
    let ahead = Grid::step(origin, actor.facing, true);

    let event = match grid.cell(ahead) {
        None => "you felt a wall",
        Some(cell) if cell.occupant.is_some() => "you felt another player",
        Some(cell) if cell.has_door() => {
            if actor.holds(ItemKind::Key) {
                // The session unlocked flag is set by the sensing pass that
                // closes this round; reach only reports the opening.
                "you opened the door"
            } else {
                "you felt a door"
            }
        }
        Some(_) => "you felt nothing",
    };
    actor.timeline.record(event);
    Ok(())
}

/// Moves ground items into the inventory, one event per item. Items that do
/// not fit stay on the ground.
pub(super) fn pick_up_items(actor: &mut ActorState, cell: &mut Cell) {
    while !cell.items.is_empty() && actor.inventory.remaining_capacity() > 0 {
        let item = cell.items.remove(0);
        actor.timeline.record(format!("you found a {item}"));
        let _ = actor.inventory.try_push(item);
    }
}

fn actor_mut<'a>(
    actors: &'a mut BTreeMap<ActorId, ActorState>,
    id: ActorId,
) -> Result<&'a mut ActorState, EngineError> {
    actors.get_mut(&id).ok_or(EngineError::UnknownActor(id))
}
