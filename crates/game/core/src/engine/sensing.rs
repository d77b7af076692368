//! Ambient perception, run for every participant after each resolved round
//! and once at game start.

use std::collections::BTreeMap;

use crate::state::{ActorId, ActorState, Grid, ItemKind};

use super::EngineError;
use super::resolve::pick_up_items;

/// Senses forward, left, and right relative to the actor's current facing,
/// then checks the actor's own cell for items.
///
/// The rotated directions are pure lookups; the persisted facing never
/// changes during sensing. A door neighbor with the key in hand unlocks the
/// door; without the key it reads as a wall, like the grid edge.
pub(super) fn surroundings_check(
    actor_id: ActorId,
    actors: &mut BTreeMap<ActorId, ActorState>,
    grid: &mut Grid,
    unlocked: &mut bool,
) -> Result<(), EngineError> {
    let position = grid
        .locate(actor_id)
        .ok_or(EngineError::ActorNotPlaced(actor_id))?;
    let (facing, has_key) = {
        let actor = actors
            .get(&actor_id)
            .ok_or(EngineError::UnknownActor(actor_id))?;
        (actor.facing, actor.holds(ItemKind::Key))
    };

    let sweep = [
        (facing, "ahead"),
        (facing.rotated_left(), "to your left"),
        (facing.rotated_right(), "to your right"),
    ];

    let mut events = Vec::new();
    for (direction, label) in sweep {
        let neighbor = Grid::step(position, direction, true);
        match grid.cell(neighbor) {
            Some(cell) if cell.occupant.is_some() => {
                events.push(format!("you sense another player {label}"));
            }
            Some(cell) if cell.has_door() => {
                if has_key {
                    *unlocked = true;
                    events.push("you opened the door".to_string());
                } else {
                    events.push(format!("you feel a wall {label}"));
                }
            }
            Some(_) => {}
            None => events.push(format!("you feel a wall {label}")),
        }
    }

    if events.is_empty() {
        events.push("you sense nothing around you".to_string());
    }

    let actor = actors
        .get_mut(&actor_id)
        .ok_or(EngineError::UnknownActor(actor_id))?;
    for event in events {
        actor.timeline.record(event);
    }

    if let Some(cell) = grid.cell_mut(position) {
        pick_up_items(actor, cell);
    }

    Ok(())
}
