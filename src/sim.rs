//! Random self-play.
//!
//! Each game runs on its own `StdRng` seeded from its index, so a batch is
//! reproducible regardless of how rayon schedules it.

use std::collections::BTreeMap;
use std::ops::Range;

use rand::{rngs::StdRng, seq::IteratorRandom, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::Rules;
use crate::game::{Game, GameStatus};

/// How one self-play game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub seed: u64,
    pub moves: u32,
    pub highest_tile: u32,
    /// Packed final grid, see [`crate::engine::Grid::raw`].
    pub final_grid: u16,
    /// False when the move cap ended the game first.
    pub stuck: bool,
}

/// Play one game choosing uniformly among the directions that change the grid.
pub fn play_random(seed: u64, rules: &Rules, max_moves: u32) -> GameSummary {
    let mut game = Game::seeded(seed, rules.clone());
    let mut chooser = StdRng::seed_from_u64(seed.rotate_left(32) ^ 0x2048);
    while game.moves() < max_moves {
        let Some(dir) = game.grid().legal_moves().choose(&mut chooser) else {
            break;
        };
        game.apply(dir);
    }
    let grid = game.grid();
    GameSummary {
        seed,
        moves: game.moves(),
        highest_tile: grid.highest_tile(),
        final_grid: grid.raw(),
        stuck: game.status() == GameStatus::Stuck,
    }
}

/// Play one game per seed in parallel, in seed order.
pub fn play_many(seeds: Range<u64>, rules: &Rules, max_moves: u32) -> Vec<GameSummary> {
    play_many_with(seeds, rules, max_moves, |_| {})
}

/// Like [`play_many`], calling `on_done` from the worker as each game finishes.
pub fn play_many_with<F>(seeds: Range<u64>, rules: &Rules, max_moves: u32, on_done: F) -> Vec<GameSummary>
where
    F: Fn(&GameSummary) + Sync,
{
    let seeds: Vec<u64> = seeds.collect();
    seeds
        .into_par_iter()
        .map(|seed| {
            let summary = play_random(seed, rules, max_moves);
            on_done(&summary);
            summary
        })
        .collect()
}

/// Aggregate over a batch of games.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub games: u64,
    pub stuck: u64,
    pub mean_moves: f64,
    pub max_moves: u32,
    /// Highest tile reached -> number of games.
    pub highest_tiles: BTreeMap<u32, u64>,
}

impl BatchReport {
    pub fn from_summaries(summaries: &[GameSummary]) -> Self {
        let games = summaries.len() as u64;
        let stuck = summaries.iter().filter(|s| s.stuck).count() as u64;
        let total: u64 = summaries.iter().map(|s| u64::from(s.moves)).sum();
        let mean_moves = if games == 0 { 0.0 } else { total as f64 / games as f64 };
        let max_moves = summaries.iter().map(|s| s.moves).max().unwrap_or(0);
        let mut highest_tiles = BTreeMap::new();
        for s in summaries {
            *highest_tiles.entry(s.highest_tile).or_insert(0) += 1;
        }
        Self { games, stuck, mean_moves, max_moves, highest_tiles }
    }

    /// Best tile seen in the batch.
    pub fn best_tile(&self) -> u32 {
        self.highest_tiles.keys().next_back().copied().unwrap_or(0)
    }
}
