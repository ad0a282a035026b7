//! The real game: board, running score, win/over state and best score.
//!
//! Everything outside the rules sits behind two adapters: a [`Renderer`]
//! that is handed a [`Frame`] after every change, and a
//! [`ScoreStore`](crate::store::ScoreStore) that keeps the best score.
//!
//! ```
//! use bot_2048::engine::Move;
//! use bot_2048::game::{Game, GameState, NullRenderer};
//! use bot_2048::store::MemoryStore;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut game = Game::new(StdRng::seed_from_u64(1), NullRenderer, MemoryStore::new());
//! game.start();
//! assert_eq!(game.board().count_empty(), 14);
//! let moved = game.available_moves().into_iter().any(|dir| game.move_dir(dir));
//! assert!(moved);
//! assert_eq!(game.state(), GameState::Playing);
//! ```

use std::fmt;

use rand::rngs::StdRng;
use rand::Rng;

use crate::engine::{Board, Move};
use crate::store::ScoreStore;

/// Tile that wins the game.
pub const WIN_TILE: u32 = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Won,
    Over,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameState::Playing => "playing",
            GameState::Won => "won",
            GameState::Over => "over",
        })
    }
}

/// Snapshot handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub board: Board,
    pub score: u64,
    pub best_score: u64,
    pub state: GameState,
    /// Points scored by the move that produced this frame, 0 otherwise.
    pub gained: u32,
}

/// Output side of the game.
pub trait Renderer {
    fn render(&mut self, frame: &Frame);
}

/// Renderer for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &Frame) {}
}

/// Result of [`Game::simulate_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Simulation {
    pub moved: bool,
    pub board: Board,
    /// Total score the game would have after the move.
    pub score: u64,
}

pub struct Game<R: Rng = StdRng> {
    board: Board,
    score: u64,
    best_score: u64,
    state: GameState,
    has_won: bool,
    keep_playing: bool,
    rng: R,
    renderer: Box<dyn Renderer + Send>,
    store: Box<dyn ScoreStore + Send>,
}

impl<R: Rng> Game<R> {
    /// A game with an empty board; call [`Game::start`] to seed it.
    ///
    /// The best score is read from `store`. A failing store is logged and
    /// treated as having no score.
    pub fn new<D, S>(rng: R, renderer: D, store: S) -> Self
    where
        D: Renderer + Send + 'static,
        S: ScoreStore + Send + 'static,
    {
        let best_score = match store.load() {
            Ok(best) => best.unwrap_or(0),
            Err(e) => {
                log::warn!("could not read best score, starting from 0: {e}");
                0
            }
        };
        Self {
            board: Board::EMPTY,
            score: 0,
            best_score,
            state: GameState::Playing,
            has_won: false,
            keep_playing: false,
            rng,
            renderer: Box::new(renderer),
            store: Box::new(store),
        }
    }

    /// Drop two random tiles on the board.
    pub fn start(&mut self) {
        self.board = self.board.with_random_tile(&mut self.rng).with_random_tile(&mut self.rng);
        self.refresh(0);
    }

    pub fn restart(&mut self) {
        self.board = Board::EMPTY;
        self.score = 0;
        self.state = GameState::Playing;
        self.has_won = false;
        self.keep_playing = false;
        self.start();
    }

    /// Continue from an arbitrary position. Win/over state is re-derived from `board`.
    pub fn resume(&mut self, board: Board, score: u64) {
        self.board = board;
        self.score = score;
        self.state = GameState::Playing;
        self.check_state();
        self.record_best();
        self.refresh(0);
    }

    /// Carry on after reaching [`WIN_TILE`]; the win check stays off from now on.
    pub fn keep_playing(&mut self) {
        self.keep_playing = true;
        self.state = GameState::Playing;
        self.refresh(0);
    }

    #[inline]
    pub fn board(&self) -> Board { self.board }

    #[inline]
    pub fn score(&self) -> u64 { self.score }

    #[inline]
    pub fn best_score(&self) -> u64 { self.best_score }

    #[inline]
    pub fn state(&self) -> GameState { self.state }

    #[inline]
    pub fn has_won(&self) -> bool { self.has_won }

    #[inline]
    pub fn keeps_playing(&self) -> bool { self.keep_playing }

    /// Moves that would change the board; empty unless the game is in play.
    pub fn available_moves(&self) -> Vec<Move> {
        if self.state != GameState::Playing {
            return Vec::new();
        }
        self.board.available_moves()
    }

    /// What `dir` would do, without touching the game.
    pub fn simulate_move(&self, dir: Move) -> Simulation {
        if self.state != GameState::Playing {
            return Simulation { moved: false, board: self.board, score: self.score };
        }
        let out = self.board.apply(dir);
        Simulation { moved: out.moved, board: out.board, score: self.score + out.score as u64 }
    }

    /// Play `dir`. Returns false, leaving the game untouched, when the game is
    /// not in play or the move changes nothing.
    pub fn move_dir(&mut self, dir: Move) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        let out = self.board.apply(dir);
        if !out.moved {
            return false;
        }
        self.score += out.score as u64;
        self.board = out.board.with_random_tile(&mut self.rng);
        self.check_state();
        self.record_best();
        self.refresh(out.score);
        true
    }

    fn check_state(&mut self) {
        if !self.has_won && !self.keep_playing && self.board.to_grid().iter().flatten().any(|&v| v == WIN_TILE) {
            self.has_won = true;
            self.state = GameState::Won;
            log::info!("reached {WIN_TILE} with score {}", self.score);
            return;
        }
        if self.board.is_terminal() {
            self.state = GameState::Over;
        }
    }

    fn record_best(&mut self) {
        if self.score <= self.best_score {
            return;
        }
        self.best_score = self.score;
        if let Err(e) = self.store.save(self.best_score) {
            log::warn!("could not save best score {}: {e}", self.best_score);
        }
    }

    fn refresh(&mut self, gained: u32) {
        let frame = Frame {
            board: self.board,
            score: self.score,
            best_score: self.best_score,
            state: self.state,
            gained,
        };
        self.renderer.render(&frame);
    }
}

impl<R: Rng> fmt::Debug for Game<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("board", &self.board)
            .field("score", &self.score)
            .field("best_score", &self.best_score)
            .field("state", &self.state)
            .field("keep_playing", &self.keep_playing)
            .finish()
    }
}
