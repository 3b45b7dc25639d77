use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use super::state::Position;

/// Occupancy of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Empty,
    Food,
    SnakeBody,
}

/// Square occupancy map, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    size: usize,
    cells: Vec<CellState>,
}

impl Grid {
    /// Create an all-empty `size` x `size` grid
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![CellState::Empty; size * size],
        }
    }

    /// Side length of the grid
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, pos: Position) -> CellState {
        self.cells[self.index(pos)]
    }

    pub fn set(&mut self, pos: Position, state: CellState) {
        let idx = self.index(pos);
        self.cells[idx] = state;
    }

    /// Mark a uniformly chosen empty cell as food.
    ///
    /// Returns `None` when the board has no empty cell left.
    pub fn place_random_food<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Position> {
        let empty: Vec<Position> = self.positions(CellState::Empty).collect();
        let pos = *empty.choose(rng)?;

        self.set(pos, CellState::Food);
        debug!(x = pos.x, y = pos.y, candidates = empty.len(), "Food placed");
        Some(pos)
    }

    /// All positions currently in `state`, in row-major order
    pub fn positions(&self, state: CellState) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, cell)| **cell == state)
            .map(|(idx, _)| Position::new(idx % self.size, idx / self.size))
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|cell| **cell == state).count()
    }

    fn index(&self, pos: Position) -> usize {
        assert!(
            pos.x < self.size && pos.y < self.size,
            "position ({}, {}) outside {}x{} grid",
            pos.x,
            pos.y,
            self.size,
            self.size
        );
        pos.y * self.size + pos.x
    }
}
