//! One game instance: a grid plus the RNG and rules that drive it.
//!
//! The grid is owned by the instance and only changes through [`Game::apply`],
//! [`Game::spawn_tile`] and [`Game::reset`]. Nothing here paints; callers take a
//! [`Snapshot`] and hand it to whatever renders it (see [`crate::session`]).
//!
//! ```
//! use lite_2048::config::Rules;
//! use lite_2048::engine::Move;
//! use lite_2048::game::Game;
//!
//! let mut game = Game::seeded(7, Rules::default());
//! assert_eq!(game.grid().count_tiles(), 2);
//! let outcome = game.apply(Move::Left);
//! assert_eq!(outcome.grid, game.grid());
//! ```

use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

use crate::config::Rules;
use crate::engine::{Grid, Move, Spawn};

/// Whether any move can still change the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Playable,
    /// Full grid, no direction changes it.
    Stuck,
}

impl GameStatus {
    pub fn of(grid: Grid) -> Self {
        if grid.is_stuck() { GameStatus::Stuck } else { GameStatus::Playable }
    }
}

/// What a single [`Game::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub direction: Move,
    /// At least one cell changed; a tile was spawned if room allowed.
    pub moved: bool,
    pub merges: u32,
    pub spawned: Option<Spawn>,
    /// Grid after the move (unchanged when `moved` is false).
    pub grid: Grid,
    pub status: GameStatus,
}

/// Read-only view of a game handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub grid: Grid,
    pub moves: u32,
    pub status: GameStatus,
    pub last_spawn: Option<Spawn>,
}

pub struct Game<R = StdRng> {
    grid: Grid,
    rng: R,
    rules: Rules,
    moves: u32,
    last_spawn: Option<Spawn>,
}

impl Game<StdRng> {
    /// Game driven by a deterministic `StdRng`.
    pub fn seeded(seed: u64, rules: Rules) -> Self {
        Game::new(StdRng::seed_from_u64(seed), rules)
    }

    /// Game driven by an OS-seeded `StdRng`.
    pub fn from_entropy(rules: Rules) -> Self {
        Game::new(StdRng::from_entropy(), rules)
    }
}

impl<R: Rng> Game<R> {
    /// Fresh grid seeded with `rules.initial_tiles` random tiles.
    pub fn new(rng: R, rules: Rules) -> Self {
        let mut game = Game { grid: Grid::EMPTY, rng, rules, moves: 0, last_spawn: None };
        game.seed_grid();
        game
    }

    /// Start from an explicit grid; nothing is spawned.
    pub fn with_grid(grid: Grid, rng: R, rules: Rules) -> Self {
        Game { grid, rng, rules, moves: 0, last_spawn: None }
    }

    fn seed_grid(&mut self) {
        self.grid = Grid::EMPTY;
        self.moves = 0;
        self.last_spawn = None;
        for _ in 0..self.rules.initial_tiles {
            if self.spawn_tile().is_none() {
                break;
            }
        }
        debug!("new grid {:?}", self.grid);
    }

    /// Discard the current grid and start over.
    pub fn reset(&mut self) {
        self.seed_grid();
    }

    /// Place a 2 or 4 in a random empty cell. No-op on a full grid.
    pub fn spawn_tile(&mut self) -> Option<Spawn> {
        let (grid, spawn) = self.grid.spawn_tile(&mut self.rng, self.rules.four_probability);
        self.grid = grid;
        if spawn.is_some() {
            self.last_spawn = spawn;
        }
        spawn
    }

    /// Slide toward `direction`; on change, replace the grid and spawn one tile.
    pub fn apply(&mut self, direction: Move) -> MoveOutcome {
        let before = self.grid;
        let slid = before.slide(direction);
        let moved = slid.grid != before;
        let mut spawned = None;
        if moved {
            self.grid = slid.grid;
            self.moves += 1;
            spawned = self.spawn_tile();
            debug!("{direction}: merges={} spawn={spawned:?} grid={:?}", slid.merges, self.grid);
        }
        let status = self.status();
        if moved && status == GameStatus::Stuck {
            info!("grid stuck after {} moves, highest tile {}", self.moves, self.grid.highest_tile());
        }
        MoveOutcome {
            direction,
            moved,
            merges: if moved { slid.merges } else { 0 },
            spawned,
            grid: self.grid,
            status,
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn status(&self) -> GameStatus {
        GameStatus::of(self.grid)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot { grid: self.grid, moves: self.moves, status: self.status(), last_spawn: self.last_spawn }
    }
}
