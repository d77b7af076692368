/// Engine tunables.
///
/// The compile-time constants bound state containers; the instance fields
/// size the grid and the round budget at game start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Grid width for a single participant.
    pub base_width: u32,

    /// Grid height for a single participant.
    pub base_height: u32,

    /// Extra width and height per participant beyond the first.
    pub growth_per_player: u32,

    /// Round allotment when the first player joins the lobby.
    pub base_rounds: u32,

    /// Extra rounds granted for each later lobby joiner, compensating for
    /// players who arrive after the initial allotment is fixed.
    pub bonus_rounds_per_joiner: u32,
}

impl GameConfig {
    /// Maximum carried items per actor.
    pub const MAX_INVENTORY_SLOTS: usize = 4;

    /// Collision outcome weights, in table order: nothing, disoriented,
    /// tripped. Six equally likely draws in total.
    pub const COLLISION_WEIGHTS: [u32; 3] = [3, 2, 1];

    pub const fn new() -> Self {
        Self {
            base_width: 3,
            base_height: 3,
            growth_per_player: 1,
            base_rounds: 20,
            bonus_rounds_per_joiner: 2,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
