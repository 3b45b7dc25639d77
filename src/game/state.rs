use std::collections::VecDeque;

use super::action::Direction;

/// A cell on the game grid. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Move one cell in a direction on a `size` x `size` torus
    pub fn wrapped_step(&self, direction: Direction, size: usize) -> Self {
        let (dx, dy) = direction.delta();
        let n = size as i64;

        Self {
            x: (self.x as i64 + dx as i64).rem_euclid(n) as usize,
            y: (self.y as i64 + dy as i64).rem_euclid(n) as usize,
        }
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at the front
    body: VecDeque<Position>,
    /// Current heading
    pub direction: Direction,
}

impl Snake {
    /// Create a snake whose body trails behind `head`, opposite to `direction`
    pub fn new(head: Position, direction: Direction, length: usize, grid_size: usize) -> Self {
        let mut body = VecDeque::with_capacity(length);
        body.push_back(head);

        let back = direction.opposite();
        for _ in 1..length {
            let prev = body[body.len() - 1];
            body.push_back(prev.wrapped_step(back, grid_size));
        }

        Self { body, direction }
    }

    /// Build a snake from explicit segments, head first
    pub fn from_segments(segments: impl IntoIterator<Item = Position>, direction: Direction) -> Self {
        Self {
            body: segments.into_iter().collect(),
            direction,
        }
    }

    /// Get the head position
    ///
    /// Panics on an empty snake; the game never lets the body run dry.
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Segments ordered head to tail
    pub fn segments(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    pub(crate) fn push_head(&mut self, pos: Position) {
        self.body.push_front(pos);
    }

    pub(crate) fn pop_tail(&mut self) -> Option<Position> {
        self.body.pop_back()
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Lifecycle of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Running,
    Paused,
    /// Terminal; the session should end
    Finished,
}

/// Why a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The head ran into the body
    Collision,
    /// No empty cell was left for new food
    BoardFull,
}
