use std::fmt;

/// Unique identifier for a registered actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque key for an inbound connection.
///
/// The engine uses it only as an identity; snapshot delivery against the
/// concrete transport happens entirely in the runtime layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

/// Discrete grid position: `x` is the row index, `y` the column index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Facing direction. The variant order is the rotation cycle: a right turn
/// advances one step, a left turn retreats one step, four turns are the
/// identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Facing {
    North,
    East,
    South,
    West,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::North, Facing::East, Facing::South, Facing::West];

    /// Unit displacement in the grid's coordinate convention:
    /// north = -x, east = -y, south = +x, west = +y.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::North => (-1, 0),
            Facing::East => (0, -1),
            Facing::South => (1, 0),
            Facing::West => (0, 1),
        }
    }

    pub fn rotated_right(self) -> Self {
        match self {
            Facing::North => Facing::East,
            Facing::East => Facing::South,
            Facing::South => Facing::West,
            Facing::West => Facing::North,
        }
    }

    pub fn rotated_left(self) -> Self {
        match self {
            Facing::North => Facing::West,
            Facing::West => Facing::South,
            Facing::South => Facing::East,
            Facing::East => Facing::North,
        }
    }
}

/// Body posture. Crouching gates item pickup on the current cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Posture {
    Standing,
    Crouched,
}

impl Posture {
    pub fn is_standing(self) -> bool {
        matches!(self, Posture::Standing)
    }
}

/// Carryable item kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ItemKind {
    Key,
}

/// Fixed cell elements. A door blocks movement like a wall until the game
/// ends; it is never an occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fixture {
    Door,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_is_a_cycle_of_order_four() {
        for start in Facing::ALL {
            let mut facing = start;
            for _ in 0..4 {
                facing = facing.rotated_left();
            }
            assert_eq!(facing, start);

            let mut facing = start;
            for _ in 0..4 {
                facing = facing.rotated_right();
            }
            assert_eq!(facing, start);
        }
    }

    #[test]
    fn left_then_right_is_identity() {
        for start in Facing::ALL {
            assert_eq!(start.rotated_left().rotated_right(), start);
            assert_eq!(start.rotated_right().rotated_left(), start);
        }
    }

    #[test]
    fn deltas_are_opposed_in_pairs() {
        let (nx, ny) = Facing::North.delta();
        let (sx, sy) = Facing::South.delta();
        assert_eq!((nx + sx, ny + sy), (0, 0));

        let (ex, ey) = Facing::East.delta();
        let (wx, wy) = Facing::West.delta();
        assert_eq!((ex + wx, ey + wy), (0, 0));
    }
}
