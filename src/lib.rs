//! lite-2048: the 2x2 "2048 Lite" merge-grid game
//!
//! This crate provides:
//! - A packed `Grid` type with the pure slide/merge step and random tile spawning (`engine`)
//! - An owned game instance with injected RNG and stuck detection (`game`)
//! - A session that pushes snapshots to a `View` after every change (`session`)
//! - A crossterm renderer and keyboard mapping (`render`, `input`)
//! - TOML configuration (`config`) and parallel random self-play (`sim`)
//!
//! Quick start:
//! ```
//! use lite_2048::engine::{Grid, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic grid initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let g0 = Grid::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let g1 = g0.make_move(Move::Left, &mut rng);
//! assert!(g1.count_tiles() >= 1);
//! ```
//!
//! Full loop with a game instance:
//! ```
//! use lite_2048::config::Rules;
//! use lite_2048::engine::Move;
//! use lite_2048::game::{Game, GameStatus};
//!
//! let mut game = Game::seeded(123, Rules::default());
//! let mut turns = 0;
//! while game.status() == GameStatus::Playable && turns < 1_000 {
//!     let Some(dir) = game.grid().legal_moves().next() else { break };
//!     game.apply(dir);
//!     turns += 1;
//! }
//! assert!(game.moves() > 0);
//! ```
//!
pub mod config;
pub mod engine;
pub mod game;
pub mod input;
pub mod render;
pub mod session;
pub mod sim;
