use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, trace};

use super::{
    action::Direction,
    config::{ConfigError, GameConfig},
    grid::{CellState, Grid},
    state::{GameStatus, Outcome, Position, Snake},
};

pub const INITIAL_SNAKE_LENGTH: usize = 3;

/// What a call to [`Game::advance`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Paused or finished; nothing changed
    Idle,
    /// Ordinary move into an empty cell
    Moved,
    /// Ate food; new food was placed at `food`
    Ate { food: Position },
    /// Ran into the body; the game is over and nothing moved
    Collided,
    /// Ate the last food with no room for more; the move completed and the game is over
    BoardFilled,
}

/// Single-player game state and its tick rule
pub struct Game {
    grid: Grid,
    snake: Snake,
    food: Option<Position>,
    status: GameStatus,
    outcome: Option<Outcome>,
    steps: u64,
    rng: StdRng,
}

impl Game {
    /// Start a game with food placement seeded from the OS
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Start a game with reproducible food placement
    pub fn with_seed(config: &GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &GameConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let size = config.grid_size;
        let centre = size / 2;
        let snake = Snake::new(
            Position::new(centre - 1, centre - 1),
            Direction::Left,
            INITIAL_SNAKE_LENGTH,
            size,
        );
        let food = Position::new(size / 9, size / 9);

        Ok(Self::from_parts(size, snake, Some(food), rng))
    }

    /// Assemble a game from an explicit snake and food, marking the grid to match
    ///
    /// Panics if the segments overlap, leave the grid, or the food sits on the snake.
    pub fn from_parts(size: usize, snake: Snake, food: Option<Position>, rng: StdRng) -> Self {
        let mut grid = Grid::new(size);
        for pos in snake.segments() {
            grid.set(pos, CellState::SnakeBody);
        }
        if let Some(food) = food {
            grid.set(food, CellState::Food);
        }

        let game = Self {
            grid,
            snake,
            food,
            status: GameStatus::Running,
            outcome: None,
            steps: 0,
            rng,
        };
        assert!(game.invariants_hold(), "snake and food overlap");
        game
    }

    /// Turn the snake; only perpendicular turns are taken
    pub fn change_direction(&mut self, requested: Direction) {
        if self.snake.direction.is_orthogonal(requested) {
            trace!(from = ?self.snake.direction, to = ?requested, "Direction changed");
            self.snake.direction = requested;
        }
    }

    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            GameStatus::Running => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Running,
            GameStatus::Finished => GameStatus::Finished,
        };
        debug!(status = ?self.status, "Pause toggled");
    }

    /// Execute one tick
    pub fn advance(&mut self) -> StepOutcome {
        if self.status != GameStatus::Running {
            return StepOutcome::Idle;
        }
        assert!(!self.snake.is_empty(), "advance called on an empty snake");

        let new_head = self
            .snake
            .head()
            .wrapped_step(self.snake.direction, self.grid.size());

        // The tail cell still reads SnakeBody here, so chasing the tail is a crash
        let ate = match self.grid.get(new_head) {
            CellState::SnakeBody => {
                self.finish(Outcome::Collision);
                return StepOutcome::Collided;
            }
            CellState::Food => true,
            CellState::Empty => false,
        };

        let outcome = if ate {
            match self.grid.place_random_food(&mut self.rng) {
                Some(food) => {
                    self.food = Some(food);
                    StepOutcome::Ate { food }
                }
                None => {
                    self.food = None;
                    self.finish(Outcome::BoardFull);
                    StepOutcome::BoardFilled
                }
            }
        } else {
            StepOutcome::Moved
        };

        if !ate {
            if let Some(tail) = self.snake.pop_tail() {
                self.grid.set(tail, CellState::Empty);
            }
        }
        self.snake.push_head(new_head);
        self.grid.set(new_head, CellState::SnakeBody);
        self.steps = self.steps.saturating_add(1);

        trace!(x = new_head.x, y = new_head.y, len = self.snake.len(), "Advanced");
        debug_assert!(self.invariants_hold());

        outcome
    }

    fn finish(&mut self, outcome: Outcome) {
        self.status = GameStatus::Finished;
        self.outcome = Some(outcome);
        info!(?outcome, length = self.snake.len(), steps = self.steps, "Game finished");
    }

    /// Grid, snake and food agree with each other
    pub fn invariants_hold(&self) -> bool {
        let body_matches = self.grid.count(CellState::SnakeBody) == self.snake.len()
            && self
                .snake
                .segments()
                .all(|pos| self.grid.get(pos) == CellState::SnakeBody);

        let food_matches = match self.food {
            Some(food) => {
                self.grid.count(CellState::Food) == 1 && self.grid.get(food) == CellState::Food
            }
            None => self.grid.count(CellState::Food) == 0,
        };

        body_matches && food_matches
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Option<Position> {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.snake.direction
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    pub fn is_paused(&self) -> bool {
        self.status == GameStatus::Paused
    }

    /// Ticks that moved the snake
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Segments grown since the start
    pub fn score(&self) -> usize {
        self.snake.len().saturating_sub(INITIAL_SNAKE_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    fn game_with(
        snake: &[(usize, usize)],
        direction: Direction,
        food: (usize, usize),
        size: usize,
    ) -> Game {
        let segments = snake.iter().map(|&(x, y)| Position::new(x, y));
        let snake = Snake::from_segments(segments, direction);
        Game::from_parts(size, snake, Some(Position::new(food.0, food.1)), rng())
    }

    fn body(game: &Game) -> Vec<(usize, usize)> {
        game.snake().segments().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn test_initial_layout() {
        let game = Game::with_seed(&GameConfig::default(), 1).unwrap();

        assert_eq!(body(&game), vec![(12, 12), (13, 12), (14, 12)]);
        assert_eq!(game.direction(), Direction::Left);
        assert_eq!(game.food(), Some(Position::new(3, 3)));
        assert_eq!(game.status(), GameStatus::Running);
        assert_eq!(game.grid().count(CellState::SnakeBody), 3);
        assert_eq!(game.grid().get(Position::new(3, 3)), CellState::Food);
        assert!(game.invariants_hold());
    }

    #[test]
    fn test_initial_layout_small_grid() {
        let game = Game::with_seed(&GameConfig::new(5), 1).unwrap();

        assert_eq!(body(&game), vec![(1, 1), (2, 1), (3, 1)]);
        assert_eq!(game.food(), Some(Position::new(0, 0)));
        assert!(game.invariants_hold());
    }

    #[test]
    fn test_reference_first_tick() {
        let mut game = Game::with_seed(&GameConfig::default(), 1).unwrap();

        assert_eq!(game.advance(), StepOutcome::Moved);

        assert_eq!(body(&game), vec![(11, 12), (12, 12), (13, 12)]);
        assert_eq!(game.grid().get(Position::new(14, 12)), CellState::Empty);
        assert_eq!(game.grid().get(Position::new(11, 12)), CellState::SnakeBody);
        assert!(!game.is_finished());
        assert_eq!(game.steps(), 1);
    }

    #[test]
    fn test_only_orthogonal_turns() {
        let mut game = game_with(&[(5, 5), (6, 5), (7, 5)], Direction::Left, (0, 0), 9);

        game.change_direction(Direction::Right);
        assert_eq!(game.direction(), Direction::Left);
        game.change_direction(Direction::Left);
        assert_eq!(game.direction(), Direction::Left);

        game.change_direction(Direction::Up);
        assert_eq!(game.direction(), Direction::Up);
        game.change_direction(Direction::Down);
        assert_eq!(game.direction(), Direction::Up);
        game.change_direction(Direction::Left);
        game.change_direction(Direction::Down);
        assert_eq!(game.direction(), Direction::Down);
    }

    #[test]
    fn test_wraps_across_left_edge() {
        let mut game = game_with(&[(0, 4), (1, 4), (2, 4)], Direction::Left, (4, 0), 9);

        assert_eq!(game.advance(), StepOutcome::Moved);
        assert_eq!(game.snake().head(), Position::new(8, 4));
        assert_eq!(game.grid().get(Position::new(2, 4)), CellState::Empty);
    }

    #[test]
    fn test_wraps_across_right_edge() {
        let mut game = game_with(&[(8, 2), (7, 2), (6, 2)], Direction::Right, (4, 0), 9);

        assert_eq!(game.advance(), StepOutcome::Moved);
        assert_eq!(game.snake().head(), Position::new(0, 2));
        assert_eq!(game.grid().get(Position::new(6, 2)), CellState::Empty);
        assert!(game.invariants_hold());
    }

    #[test]
    fn test_wraps_across_top_edge() {
        let mut game = game_with(&[(5, 0), (5, 1), (5, 2)], Direction::Up, (0, 4), 9);

        assert_eq!(game.advance(), StepOutcome::Moved);
        assert_eq!(game.snake().head(), Position::new(5, 8));
        assert_eq!(game.grid().get(Position::new(5, 2)), CellState::Empty);
        assert!(game.invariants_hold());
    }

    #[test]
    fn test_wraps_across_bottom_edge() {
        let mut game = game_with(&[(3, 8), (3, 7), (3, 6)], Direction::Down, (0, 4), 9);

        game.advance();
        assert_eq!(game.snake().head(), Position::new(3, 0));
        assert!(game.invariants_hold());
    }

    #[test]
    fn test_growth_on_food() {
        let mut game = game_with(&[(5, 5), (6, 5), (7, 5)], Direction::Left, (4, 5), 9);

        let outcome = game.advance();

        let food = match outcome {
            StepOutcome::Ate { food } => food,
            other => panic!("expected to eat, got {:?}", other),
        };
        assert_eq!(game.snake().len(), 4);
        assert_eq!(game.snake().head(), Position::new(4, 5));
        assert_eq!(game.grid().get(Position::new(7, 5)), CellState::SnakeBody);
        assert_eq!(game.food(), Some(food));
        assert!(game.snake().segments().all(|pos| pos != food));
        assert_eq!(game.grid().get(food), CellState::Food);
        assert_eq!(game.score(), 1);
        assert!(game.invariants_hold());
    }

    #[test]
    fn test_collision_leaves_state_untouched() {
        // Head at (5,5) heading Up into (5,4), which is part of the body
        let segments = [(5, 5), (6, 5), (6, 4), (5, 4), (4, 4)];
        let mut game = game_with(&segments, Direction::Up, (0, 0), 9);
        let grid_before = game.grid().clone();

        assert_eq!(game.advance(), StepOutcome::Collided);

        assert!(game.is_finished());
        assert_eq!(game.outcome(), Some(Outcome::Collision));
        assert_eq!(body(&game), segments.to_vec());
        assert_eq!(game.grid(), &grid_before);
        assert_eq!(game.steps(), 0);
    }

    #[test]
    fn test_moving_onto_tail_is_collision() {
        // Square loop: the head's next cell is the tail, which would vacate this tick
        let segments = [(4, 4), (5, 4), (5, 5), (4, 5)];
        let mut game = game_with(&segments, Direction::Down, (0, 0), 9);

        assert_eq!(game.advance(), StepOutcome::Collided);
        assert!(game.is_finished());
        assert_eq!(body(&game), segments.to_vec());
    }

    #[test]
    fn test_board_full_finishes_after_growing() {
        // 5x5 board with every cell but the food taken by the snake
        let mut segments = Vec::new();
        for y in 0..5 {
            let row: Vec<usize> = if y % 2 == 0 { (0..5).collect() } else { (0..5).rev().collect() };
            for x in row {
                segments.push((x, y));
            }
        }
        let food = segments.remove(0);
        // Head is (1,0), heading Left onto the food at (0,0)
        let mut game = game_with(&segments, Direction::Left, food, 5);
        assert!(game.invariants_hold());

        assert_eq!(game.advance(), StepOutcome::BoardFilled);

        assert!(game.is_finished());
        assert_eq!(game.outcome(), Some(Outcome::BoardFull));
        assert_eq!(game.snake().len(), 25);
        assert_eq!(game.snake().head(), Position::new(0, 0));
        assert_eq!(game.food(), None);
        assert_eq!(game.grid().count(CellState::Empty), 0);
        assert!(game.invariants_hold());
    }

    #[test]
    fn test_paused_game_does_not_move() {
        let mut game = Game::with_seed(&GameConfig::default(), 3).unwrap();
        game.toggle_pause();
        assert!(game.is_paused());

        assert_eq!(game.advance(), StepOutcome::Idle);
        assert_eq!(body(&game), vec![(12, 12), (13, 12), (14, 12)]);

        game.change_direction(Direction::Up);
        assert_eq!(game.direction(), Direction::Up);

        game.toggle_pause();
        assert_eq!(game.advance(), StepOutcome::Moved);
        assert_eq!(game.snake().head(), Position::new(12, 11));
    }

    #[test]
    fn test_finished_game_stays_finished() {
        let mut game = game_with(&[(4, 4), (5, 4), (5, 5), (4, 5)], Direction::Down, (0, 0), 9);
        game.advance();

        game.toggle_pause();
        assert_eq!(game.status(), GameStatus::Finished);
        assert_eq!(game.advance(), StepOutcome::Idle);
        assert_eq!(game.steps(), 0);
    }

    #[test]
    #[should_panic(expected = "empty snake")]
    fn test_advance_on_empty_snake_panics() {
        let snake = Snake::from_segments(Vec::new(), Direction::Left);
        let mut game = Game::from_parts(9, snake, Some(Position::new(0, 0)), rng());
        game.advance();
    }

    #[test]
    fn test_step_counter_saturates() {
        let mut game = Game::with_seed(&GameConfig::default(), 1).unwrap();
        game.steps = u64::MAX;

        assert_eq!(game.advance(), StepOutcome::Moved);
        assert_eq!(game.steps(), u64::MAX);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Game::with_seed(&GameConfig::new(3), 0).is_err());
        assert!(Game::with_seed(&GameConfig::new(1), 0).is_err());
        assert!(Game::new(&GameConfig::new(28)).is_err());
    }

    #[test]
    #[should_panic(expected = "overlap")]
    fn test_food_on_snake_rejected() {
        game_with(&[(4, 4), (5, 4), (6, 4)], Direction::Left, (5, 4), 9);
    }

    #[test]
    #[should_panic(expected = "overlap")]
    fn test_duplicate_segments_rejected() {
        game_with(&[(4, 4), (5, 4), (4, 4)], Direction::Left, (0, 0), 9);
    }

    #[test]
    fn test_invariants_hold_over_long_run() {
        let mut game = Game::with_seed(&GameConfig::small(), 11).unwrap();
        let turns = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

        for tick in 0..500 {
            if tick % 7 == 0 {
                game.change_direction(turns[(tick / 7) % turns.len()]);
            }
            game.advance();
            assert!(game.invariants_hold(), "broken at tick {}", tick);
            assert!(game.grid().count(CellState::Food) <= 1);
            if game.is_finished() {
                break;
            }
        }
    }
}
