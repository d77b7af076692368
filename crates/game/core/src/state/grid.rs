use crate::rng::OutcomeSource;

use super::{ActorId, Facing, Fixture, ItemKind, Position};

/// One cell of the room.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub occupant: Option<ActorId>,
    pub items: Vec<ItemKind>,
    pub fixture: Option<Fixture>,
}

impl Cell {
    /// A cell is empty when nothing can be collided with in it: no occupant
    /// and no fixture. Ground items do not block placement.
    pub fn is_empty(&self) -> bool {
        self.occupant.is_none() && self.fixture.is_none()
    }

    pub fn has_door(&self) -> bool {
        matches!(self.fixture, Some(Fixture::Door))
    }
}

/// Fixed-size rectangular room holding at most one occupant per cell.
///
/// The grid owns no game semantics beyond the single-occupant invariant;
/// collision and interaction rules live in the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.height as i32
            && position.y < self.width as i32
    }

    fn index(&self, position: Position) -> usize {
        (position.x as u32 * self.width + position.y as u32) as usize
    }

    /// Bounds-checked lookup; `None` outside `[0,width) x [0,height)`.
    pub fn cell(&self, position: Position) -> Option<&Cell> {
        if self.contains(position) {
            self.cells.get(self.index(position))
        } else {
            None
        }
    }

    pub fn cell_mut(&mut self, position: Position) -> Option<&mut Cell> {
        if self.contains(position) {
            let index = self.index(position);
            self.cells.get_mut(index)
        } else {
            None
        }
    }

    /// Linear scan for the cell occupied by `actor`.
    pub fn locate(&self, actor: ActorId) -> Option<Position> {
        self.positions().find(|&position| {
            self.cell(position)
                .is_some_and(|cell| cell.occupant == Some(actor))
        })
    }

    /// One step from `position` along `facing`; backward steps negate the
    /// unit vector. The result may be out of bounds.
    pub fn step(position: Position, facing: Facing, forward: bool) -> Position {
        let (dx, dy) = facing.delta();
        let sign = if forward { 1 } else { -1 };
        Position::new(position.x + sign * dx, position.y + sign * dy)
    }

    fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |x| (0..width).map(move |y| Position::new(x, y)))
    }

    /// Empty cells in row-major order, the deterministic candidate order for
    /// uniform picks.
    pub fn empty_cells(&self) -> Vec<Position> {
        self.positions()
            .filter(|&position| self.cell(position).is_some_and(Cell::is_empty))
            .collect()
    }

    /// Empty orthogonal neighbors of `position`, probed in the fixed
    /// north/east/south/west order.
    pub fn empty_neighbors(&self, position: Position) -> Vec<Position> {
        Facing::ALL
            .iter()
            .map(|&facing| Self::step(position, facing, true))
            .filter(|&neighbor| self.cell(neighbor).is_some_and(Cell::is_empty))
            .collect()
    }

    fn border_positions(&self) -> Vec<Position> {
        self.positions()
            .filter(|position| {
                position.x == 0
                    || position.y == 0
                    || position.x == self.height as i32 - 1
                    || position.y == self.width as i32 - 1
            })
            .collect()
    }

    /// Places `actor` on a uniformly random empty cell with a uniformly
    /// random facing. Returns `None` when the grid has no empty cell left.
    pub fn place_randomly(
        &mut self,
        actor: ActorId,
        rng: &mut dyn OutcomeSource,
    ) -> Option<(Position, Facing)> {
        let candidates = self.empty_cells();
        if candidates.is_empty() {
            return None;
        }
        let position = candidates[rng.pick_index(candidates.len())];
        let facing = Facing::ALL[rng.pick_index(Facing::ALL.len())];
        self.cell_mut(position)?.occupant = Some(actor);
        Some((position, facing))
    }

    /// Moves `actor` to a uniformly random empty orthogonal neighbor.
    /// No-op (and no draw) when no empty neighbor exists.
    pub fn relocate_to_nearby_empty(
        &mut self,
        actor: ActorId,
        rng: &mut dyn OutcomeSource,
    ) -> Option<Position> {
        let origin = self.locate(actor)?;
        let candidates = self.empty_neighbors(origin);
        if candidates.is_empty() {
            return None;
        }
        let destination = candidates[rng.pick_index(candidates.len())];
        self.move_occupant(origin, destination);
        Some(destination)
    }

    /// Moves the occupant of `from` to `to`. Both cells must exist and `to`
    /// must be unoccupied.
    pub fn move_occupant(&mut self, from: Position, to: Position) {
        debug_assert!(self.cell(to).is_some_and(|cell| cell.occupant.is_none()));
        let occupant = self
            .cell_mut(from)
            .and_then(|cell| cell.occupant.take());
        if let Some(cell) = self.cell_mut(to) {
            cell.occupant = occupant;
        }
    }

    /// Places the door on a uniformly random empty border cell. Called
    /// exactly once per game.
    pub fn place_door(&mut self, rng: &mut dyn OutcomeSource) -> Option<Position> {
        let candidates: Vec<Position> = self
            .border_positions()
            .into_iter()
            .filter(|&position| self.cell(position).is_some_and(Cell::is_empty))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let position = candidates[rng.pick_index(candidates.len())];
        self.cell_mut(position)?.fixture = Some(Fixture::Door);
        Some(position)
    }

    /// Places the key on a uniformly random empty cell. Called exactly once
    /// per game.
    pub fn place_key(&mut self, rng: &mut dyn OutcomeSource) -> Option<Position> {
        let candidates = self.empty_cells();
        if candidates.is_empty() {
            return None;
        }
        let position = candidates[rng.pick_index(candidates.len())];
        self.cell_mut(position)?.items.push(ItemKind::Key);
        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use crate::rng::PcgSource;

    use super::*;

    #[test]
    fn lookup_is_bounds_checked() {
        let grid = Grid::new(3, 3);
        assert!(grid.cell(Position::new(0, 0)).is_some());
        assert!(grid.cell(Position::new(2, 2)).is_some());
        assert!(grid.cell(Position::new(-1, 0)).is_none());
        assert!(grid.cell(Position::new(0, 3)).is_none());
        assert!(grid.cell(Position::new(3, 0)).is_none());
    }

    #[test]
    fn step_follows_the_coordinate_convention() {
        let origin = Position::new(1, 1);
        assert_eq!(Grid::step(origin, Facing::North, true), Position::new(0, 1));
        assert_eq!(Grid::step(origin, Facing::East, true), Position::new(1, 0));
        assert_eq!(Grid::step(origin, Facing::South, true), Position::new(2, 1));
        assert_eq!(Grid::step(origin, Facing::West, true), Position::new(1, 2));
        // A backward step is the exact inverse.
        assert_eq!(Grid::step(origin, Facing::North, false), Position::new(2, 1));
    }

    #[test]
    fn placement_fills_an_empty_cell_and_is_findable() {
        let mut grid = Grid::new(3, 3);
        let mut rng = PcgSource::seeded(7);
        let actor = ActorId(1);

        let (position, _) = grid.place_randomly(actor, &mut rng).unwrap();
        assert_eq!(grid.locate(actor), Some(position));
        assert_eq!(grid.empty_cells().len(), 8);
    }

    #[test]
    fn door_lands_on_the_border_and_key_elsewhere() {
        let mut grid = Grid::new(5, 5);
        let mut rng = PcgSource::seeded(99);

        let door = grid.place_door(&mut rng).unwrap();
        assert!(door.x == 0 || door.y == 0 || door.x == 4 || door.y == 4);
        assert!(grid.cell(door).unwrap().has_door());

        let key = grid.place_key(&mut rng).unwrap();
        assert_ne!(door, key);
        assert_eq!(grid.cell(key).unwrap().items, vec![ItemKind::Key]);
    }

    #[test]
    fn relocation_in_a_sealed_corner_is_a_no_op() {
        let mut grid = Grid::new(2, 2);
        let mut rng = PcgSource::seeded(3);
        let cornered = ActorId(1);

        grid.cell_mut(Position::new(0, 0)).unwrap().occupant = Some(cornered);
        grid.cell_mut(Position::new(0, 1)).unwrap().occupant = Some(ActorId(2));
        grid.cell_mut(Position::new(1, 0)).unwrap().occupant = Some(ActorId(3));

        assert_eq!(grid.relocate_to_nearby_empty(cornered, &mut rng), None);
        assert_eq!(grid.locate(cornered), Some(Position::new(0, 0)));
    }

    #[test]
    fn relocation_moves_to_an_adjacent_empty_cell() {
        let mut grid = Grid::new(3, 3);
        let mut rng = PcgSource::seeded(3);
        let actor = ActorId(1);
        let origin = Position::new(1, 1);

        grid.cell_mut(origin).unwrap().occupant = Some(actor);
        let destination = grid.relocate_to_nearby_empty(actor, &mut rng).unwrap();

        assert_ne!(destination, origin);
        assert_eq!(
            (destination.x - origin.x).abs() + (destination.y - origin.y).abs(),
            1
        );
        assert_eq!(grid.locate(actor), Some(destination));
        assert!(grid.cell(origin).unwrap().occupant.is_none());
    }
}
