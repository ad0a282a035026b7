//! Timer-driven automated play.
//!
//! One tick is one full search-and-move cycle; ticks never overlap. A search
//! cannot be interrupted, so stopping takes effect at the next tick boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::DEFAULT_TICK_MS;
use crate::engine::Move;
use crate::expectimax::Bot;
use crate::game::{Game, GameState};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Moved(Move),
    /// The game had just been won; play was resumed instead of moving.
    Resumed,
    Stopped(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    GameOver,
    NoMoves,
    MoveLimit,
    Cancelled,
}

/// Outcome of [`AutoPlayer::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub moves: u64,
    pub reason: StopReason,
    /// Ticks whose search ran past the tick interval.
    pub overruns: u64,
}

/// Stops a running [`AutoPlayer`] from elsewhere (another thread, a renderer).
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) { self.0.store(false, Ordering::Relaxed); }

    pub fn is_running(&self) -> bool { self.0.load(Ordering::Relaxed) }
}

pub struct AutoPlayer {
    bot: Bot,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl AutoPlayer {
    pub fn new(bot: Bot) -> Self {
        Self { bot, interval: Duration::from_millis(DEFAULT_TICK_MS), running: Arc::new(AtomicBool::new(false)) }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn set_interval(&mut self, interval: Duration) {
        log::debug!("tick interval {:?} -> {:?}", self.interval, interval);
        self.interval = interval;
    }

    #[inline]
    pub fn interval(&self) -> Duration { self.interval }

    pub fn start(&mut self) { self.running.store(true, Ordering::Relaxed); }

    pub fn stop(&mut self) { self.running.store(false, Ordering::Relaxed); }

    /// Flip between running and stopped; returns the new state.
    pub fn toggle(&mut self) -> bool {
        let now_running = !self.is_running();
        self.running.store(now_running, Ordering::Relaxed);
        now_running
    }

    #[inline]
    pub fn is_running(&self) -> bool { self.running.load(Ordering::Relaxed) }

    pub fn stop_handle(&self) -> StopHandle { StopHandle(Arc::clone(&self.running)) }

    #[inline]
    pub fn bot(&self) -> &Bot { &self.bot }

    /// One search-and-move cycle.
    pub fn tick<R: Rng>(&mut self, game: &mut Game<R>) -> Tick {
        if game.state() == GameState::Won && !game.keeps_playing() {
            game.keep_playing();
            return Tick::Resumed;
        }
        if game.state() != GameState::Playing {
            self.stop();
            return Tick::Stopped(StopReason::GameOver);
        }
        match self.bot.choose_move(game.board()) {
            Some(dir) if game.move_dir(dir) => Tick::Moved(dir),
            Some(dir) => {
                log::warn!("bot chose {dir} but it did not change the board");
                self.stop();
                Tick::Stopped(StopReason::NoMoves)
            }
            None => {
                self.stop();
                Tick::Stopped(StopReason::NoMoves)
            }
        }
    }

    /// Tick until the game ends, `limit` moves were made, or someone stops us.
    pub fn run<R: Rng>(&mut self, game: &mut Game<R>, limit: Option<u64>) -> RunReport {
        self.start();
        let mut moves = 0u64;
        let mut overruns = 0u64;
        let reason = loop {
            if !self.is_running() {
                break StopReason::Cancelled;
            }
            if limit.is_some_and(|max| moves >= max) {
                self.stop();
                break StopReason::MoveLimit;
            }
            let started = Instant::now();
            match self.tick(game) {
                Tick::Moved(_) => moves += 1,
                Tick::Resumed => {}
                Tick::Stopped(reason) => break reason,
            }
            let elapsed = started.elapsed();
            if elapsed < self.interval {
                thread::sleep(self.interval - elapsed);
            } else if !self.interval.is_zero() {
                overruns += 1;
                if overruns == 1 {
                    log::warn!("search took {elapsed:?}, longer than the {:?} tick; not waiting", self.interval);
                } else {
                    log::debug!("tick overrun #{overruns}: {elapsed:?}");
                }
            }
        };
        log::info!("stopped after {moves} moves ({reason:?}), score {}", game.score());
        RunReport { moves, reason, overruns }
    }
}

impl std::fmt::Debug for AutoPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoPlayer")
            .field("bot", &self.bot)
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}
