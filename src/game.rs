use crate::config::{ConfigError, GameConfig};
use crate::energy::Energy;
use crate::pos::{Dir, Pos};
use crate::sensors::{self, Observation};
use ahash::AHashSet;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::debug;

/// Random draws tried before falling back to sampling the free cells directly.
const FOOD_PLACEMENT_ATTEMPTS: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverCause {
    WallCollision,
    SelfCollision,
    EnergyExhausted,
    /// The snake covers every cell, so no food can be placed.
    BoardFilled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub cause: GameOverCause,
    /// Head cell the fatal move targeted. For collisions the snake never occupies it.
    pub at: Pos,
    pub tick: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Ready,
    Running,
    Over(GameOver),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Ate,
    Over(GameOver),
    /// The game had already ended; nothing changed.
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("snake must have at least one segment")]
    EmptySnake,
    #[error("{0} lies outside the grid")]
    OutOfBounds(Pos),
    #[error("snake occupies {0} more than once")]
    Overlap(Pos),
    #[error("segments {0} and {1} are not adjacent")]
    Disconnected(Pos, Pos),
    #[error("food at {0} sits on the snake")]
    FoodOnSnake(Pos),
    #[error("heading {0} points back into the neck")]
    HeadingIntoNeck(Dir),
}

/// One self-contained Snake simulation. Owns all of its state, including its RNG,
/// so independent instances can be stepped on different threads.
#[derive(Clone, Debug)]
pub struct Game {
    config: GameConfig,
    width: i32,
    height: i32,
    snake: VecDeque<Pos>,
    occupied: AHashSet<Pos>,
    dir: Dir,
    pending: Dir,
    food: Pos,
    energy: Energy,
    score: u32,
    ticks: u64,
    status: Status,
    rng: SmallRng,
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut game = Self::blank(config);
        game.reset();
        Ok(game)
    }

    /// Builds a game from an explicit layout instead of the reset layout.
    /// `snake` is head first; consecutive segments must be orthogonally adjacent.
    pub fn from_parts(
        config: GameConfig,
        snake: impl IntoIterator<Item = Pos>,
        heading: Dir,
        food: Pos,
    ) -> Result<Self, LayoutError> {
        config.validate()?;
        let mut game = Self::blank(config);
        let mut prev: Option<Pos> = None;
        for p in snake {
            if !game.is_in_bounds(p) {
                return Err(LayoutError::OutOfBounds(p));
            }
            if !game.occupied.insert(p) {
                return Err(LayoutError::Overlap(p));
            }
            if let Some(q) = prev {
                if (q.x - p.x).abs() + (q.y - p.y).abs() != 1 {
                    return Err(LayoutError::Disconnected(q, p));
                }
            }
            game.snake.push_back(p);
            prev = Some(p);
        }
        if game.snake.is_empty() {
            return Err(LayoutError::EmptySnake);
        }
        if game.snake.get(1) == Some(&game.head().step(heading)) {
            return Err(LayoutError::HeadingIntoNeck(heading));
        }
        if !game.is_in_bounds(food) {
            return Err(LayoutError::OutOfBounds(food));
        }
        if game.occupied.contains(&food) {
            return Err(LayoutError::FoodOnSnake(food));
        }
        game.food = food;
        game.dir = heading;
        game.pending = heading;
        Ok(game)
    }

    fn blank(config: GameConfig) -> Self {
        let rng = make_rng(config.seed);
        Self {
            width: config.grid_width as i32,
            height: config.grid_height as i32,
            snake: VecDeque::new(),
            occupied: AHashSet::new(),
            dir: Dir::Right,
            pending: Dir::Right,
            food: Pos::new(0, 0),
            energy: Energy::from_config(&config),
            score: 0,
            ticks: 0,
            status: Status::Ready,
            rng,
            config,
        }
    }

    /// Back to the starting layout with the current configuration.
    pub fn reset(&mut self) {
        let len = self.config.initial_snake_length as i32;
        let (cx, cy) = (self.width / 2, self.height / 2);
        self.snake.clear();
        self.occupied.clear();
        for i in 0..len {
            let p = Pos::new(cx - i, cy);
            self.snake.push_back(p);
            self.occupied.insert(p);
        }
        self.dir = Dir::Right;
        self.pending = Dir::Right;
        self.energy = Energy::from_config(&self.config);
        self.score = 0;
        self.ticks = 0;
        self.status = Status::Ready;
        self.rng = make_rng(self.config.seed);
        let food = self.place_food();
        debug_assert!(food.is_some(), "validated config must leave a free cell");
        self.food = food.unwrap_or(self.food);
    }

    /// Swaps in a new configuration and resets. On error the game is left untouched.
    pub fn reset_with(&mut self, config: GameConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.width = config.grid_width as i32;
        self.height = config.grid_height as i32;
        self.config = config;
        self.reset();
        Ok(())
    }

    /// Queues a turn for the next step. Reversals and calls after game over are ignored.
    pub fn apply_action(&mut self, dir: Dir) {
        if self.is_over() || dir == self.dir.opposite() {
            return;
        }
        self.pending = dir;
    }

    pub fn step(&mut self) -> StepOutcome {
        if self.is_over() {
            return StepOutcome::Ignored;
        }
        self.status = Status::Running;
        self.ticks += 1;

        if self.pending != self.dir.opposite() {
            self.dir = self.pending;
        }
        let new_head = self.head().step(self.dir);

        if let Some(cause) = self.collision_at(new_head) {
            return self.finish(cause, new_head);
        }

        let ate = new_head == self.food;
        if !ate {
            if let Some(tail) = self.snake.pop_back() {
                self.occupied.remove(&tail);
            }
        }
        self.snake.push_front(new_head);
        self.occupied.insert(new_head);

        if ate {
            self.score += 1;
            self.energy.feed();
            debug!(tick = self.ticks, score = self.score, at = %new_head, "food eaten");
            return match self.place_food() {
                Some(food) => {
                    self.food = food;
                    StepOutcome::Ate
                }
                None => self.finish(GameOverCause::BoardFilled, new_head),
            };
        }

        if self.energy.drain() {
            return self.finish(GameOverCause::EnergyExhausted, new_head);
        }
        StepOutcome::Moved
    }

    fn finish(&mut self, cause: GameOverCause, at: Pos) -> StepOutcome {
        let over = GameOver { cause, at, tick: self.ticks };
        debug!(?cause, tick = self.ticks, score = self.score, "game over");
        self.status = Status::Over(over);
        StepOutcome::Over(over)
    }

    /// Uniform pick among free cells, or `None` when the snake fills the grid.
    fn place_food(&mut self) -> Option<Pos> {
        let cells = self.width as usize * self.height as usize;
        if self.snake.len() >= cells {
            return None;
        }
        for _ in 0..FOOD_PLACEMENT_ATTEMPTS {
            let p = Pos::new(
                self.rng.gen_range(0..self.width),
                self.rng.gen_range(0..self.height),
            );
            if !self.occupied.contains(&p) {
                return Some(p);
            }
        }
        let free: Vec<Pos> = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Pos::new(x, y)))
            .filter(|p| !self.occupied.contains(p))
            .collect();
        free.choose(&mut self.rng).copied()
    }

    pub fn is_in_bounds(&self, p: Pos) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    /// With `exclude_tail_if_moving` the tail cell counts as free, since a step
    /// that does not eat vacates it.
    pub fn is_occupied_by_snake(&self, p: Pos, exclude_tail_if_moving: bool) -> bool {
        if !self.occupied.contains(&p) {
            return false;
        }
        !(exclude_tail_if_moving && self.snake.back() == Some(&p))
    }

    /// What would end the game if the head moved onto `p` this tick.
    pub fn collision_at(&self, p: Pos) -> Option<GameOverCause> {
        if !self.is_in_bounds(p) {
            Some(GameOverCause::WallCollision)
        } else if self.is_occupied_by_snake(p, true) {
            Some(GameOverCause::SelfCollision)
        } else {
            None
        }
    }

    pub fn observation(&self) -> Observation {
        sensors::observe(self)
    }

    pub fn head(&self) -> Pos {
        // Never empty: reset and from_parts both install at least one segment.
        self.snake[0]
    }

    pub fn snake(&self) -> &VecDeque<Pos> {
        &self.snake
    }

    pub fn food(&self) -> Pos {
        self.food
    }

    pub fn heading(&self) -> Dir {
        self.dir
    }

    pub fn pending(&self) -> Dir {
        self.pending
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn energy(&self) -> i32 {
        self.energy.value()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, Status::Over(_))
    }

    pub fn game_over(&self) -> Option<GameOver> {
        match self.status {
            Status::Over(over) => Some(over),
            _ => None,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
