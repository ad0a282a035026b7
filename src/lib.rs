//! bot-2048: a 2048 game engine plus a search-based autoplayer
//!
//! This crate provides:
//! - A compact `Board` type with table-driven moves (`engine` module)
//! - The real game around it: score, win/over state, best score (`game`, `store`)
//! - Four move-selection strategies, from random to enhanced expectimax (`expectimax` module)
//! - A tick-driven autoplayer (`autoplay`) configured from TOML (`config`)
//!
//! Quick start:
//! ```
//! use bot_2048::engine::{self as GameEngine, Board, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // One-time table init
//! GameEngine::new();
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let b0 = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let out = b0.apply(Move::Left);
//! assert_eq!(out.board.sum_tiles(), b0.sum_tiles());
//! ```
//!
//! Letting the bot play:
//! ```
//! use bot_2048::autoplay::{AutoPlayer, StopReason};
//! use bot_2048::expectimax::{Bot, SearchConfig, Strategy, Weights};
//! use bot_2048::game::{Game, NullRenderer};
//! use bot_2048::store::MemoryStore;
//! use rand::{rngs::StdRng, SeedableRng};
//! use std::time::Duration;
//!
//! let mut game = Game::new(StdRng::seed_from_u64(1), NullRenderer, MemoryStore::new());
//! game.start();
//! let bot = Bot::with_seed(Strategy::Greedy, SearchConfig::default(), Weights::default(), 1);
//! let mut player = AutoPlayer::new(bot).with_interval(Duration::ZERO);
//! let report = player.run(&mut game, Some(20));
//! assert_eq!(report.moves, 20);
//! assert_eq!(report.reason, StopReason::MoveLimit);
//! ```
pub mod autoplay;
pub mod config;
pub mod engine;
pub mod expectimax;
pub mod game;
pub mod store;
