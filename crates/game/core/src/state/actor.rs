use arrayvec::ArrayVec;

use crate::config::GameConfig;

use super::{ActorId, Facing, ItemKind, Posture, Timeline};

/// Per-player mutable state. Position is tracked by the grid, not here.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorState {
    pub id: ActorId,
    pub name: String,
    pub facing: Facing,
    pub posture: Posture,
    pub inventory: ArrayVec<ItemKind, { GameConfig::MAX_INVENTORY_SLOTS }>,
    pub timeline: Timeline,
}

impl ActorState {
    pub fn new(id: ActorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            facing: Facing::North,
            posture: Posture::Standing,
            inventory: ArrayVec::new(),
            timeline: Timeline::new(),
        }
    }

    pub fn rotate_left(&mut self) {
        self.facing = self.facing.rotated_left();
    }

    pub fn rotate_right(&mut self) {
        self.facing = self.facing.rotated_right();
    }

    pub fn holds(&self, item: ItemKind) -> bool {
        self.inventory.contains(&item)
    }

    pub fn is_standing(&self) -> bool {
        self.posture.is_standing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotations_compose_to_identity() {
        let mut actor = ActorState::new(ActorId(0), "tester");
        let start = actor.facing;
        actor.rotate_left();
        actor.rotate_right();
        assert_eq!(actor.facing, start);
    }

    #[test]
    fn new_actor_carries_nothing() {
        let actor = ActorState::new(ActorId(0), "tester");
        assert!(actor.inventory.is_empty());
        assert!(!actor.holds(ItemKind::Key));
        assert!(actor.is_standing());
    }
}
