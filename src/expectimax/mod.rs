//! Move-selection policies for 2048.
//!
//! Four strategies share one capability, [`Policy::best_move`]:
//! - [`RandomPolicy`]: uniform choice among legal moves.
//! - [`Greedy`]: one-ply lookahead scored by the base evaluation.
//! - [`Expectimax`]: exact depth-limited expectimax, base evaluation at the leaves.
//! - [`EnhancedExpectimax`]: expectimax with alpha-beta bounds, a bounded
//!   transposition cache, corner-first move ordering, limited chance
//!   branching, adaptive depth and the enhanced evaluation.
//!
//! [`Bot`] owns whichever policy a [`Strategy`] selects.
//!
//! Quick start
//! ```
//! use bot_2048::engine::Board;
//! use bot_2048::expectimax::{Bot, SearchConfig, Strategy, Weights};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! let b0 = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//!
//! let cfg = SearchConfig { max_depth: 3, ..SearchConfig::default() };
//! let mut bot = Bot::with_seed(Strategy::Enhanced, cfg, Weights::default(), 7);
//! assert!(bot.choose_move(b0).is_some());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::{Board, Move};

mod cache;
mod greedy;
mod heuristic;
mod ordering;
mod random;
mod search_enhanced;
mod search_seq;

pub use cache::{CacheKey, Ply, SearchCache};
pub use greedy::Greedy;
pub use heuristic::{base_score, enhanced_score, Weights};
pub use ordering::{cell_value, move_order, ranked_empty_cells};
pub use random::RandomPolicy;
pub use search_enhanced::EnhancedExpectimax;
pub use search_seq::Expectimax;

/// A move-selection strategy.
pub trait Policy {
    /// Best move for `board`, or `None` when no move changes it.
    fn best_move(&mut self, board: Board) -> Option<Move>;

    fn name(&self) -> &'static str;

    /// Statistics collected by the last call to [`Policy::best_move`].
    fn last_stats(&self) -> SearchStats { SearchStats::default() }
}

/// Strategy selector, as named on the command line and in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Random,
    Greedy,
    Expectimax,
    #[default]
    Enhanced,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Random => "random",
            Strategy::Greedy => "greedy",
            Strategy::Expectimax => "expectimax",
            Strategy::Enhanced => "enhanced",
        })
    }
}

/// Configurable knobs for the search policies.
///
/// - `max_depth`: base search depth in plies, counting the root move.
/// - `cache_capacity`: entries the enhanced cache may hold before it is cleared.
/// - `late_game_tile`: max tile at which chance nodes narrow further.
/// - `late_game_chance_cells` / `chance_cells`: spawn cells examined per chance node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_depth: u32,
    pub cache_capacity: usize,
    pub late_game_tile: u32,
    pub late_game_chance_cells: usize,
    pub chance_cells: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_depth: 5, cache_capacity: 10_000, late_game_tile: 512, late_game_chance_cells: 4, chance_cells: 6 }
    }
}

/// Per-branch expected value at the root.
///
/// - `ev` is the value of taking `dir` from the current board.
/// - `legal` is false when the move is a no-op for the current board.
#[derive(Debug, Clone, Copy)]
pub struct BranchEval {
    pub dir: Move,
    pub ev: f64,
    pub legal: bool,
}

impl BranchEval {
    fn illegal(dir: Move) -> Self { BranchEval { dir, ev: 0.0, legal: false } }
}

/// Basic search stats.
///
/// `nodes` and `depth` describe the last search; the cache counters are
/// cumulative over the policy's lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub peak_nodes: u64,
    pub depth: u32,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl SearchStats {
    /// Fraction of cache lookups that hit, 0 when nothing was looked up.
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 { 0.0 } else { self.cache_hits as f64 / total as f64 }
    }
}

/// Pick the highest `ev` among legal branches, visiting them in `order`.
/// Ties go to the branch visited first.
fn pick_best(evals: &[BranchEval; 4], order: &[Move; 4]) -> Option<Move> {
    let mut best: Option<(Move, f64)> = None;
    for &dir in order {
        let branch = evals[dir.index()];
        if branch.legal && best.map_or(true, |(_, ev)| branch.ev > ev) {
            best = Some((dir, branch.ev));
        }
    }
    best.map(|(dir, _)| dir)
}

/// The automated player: a [`Strategy`] plus the policy it selected.
pub struct Bot {
    strategy: Strategy,
    policy: Box<dyn Policy + Send>,
}

impl Bot {
    pub fn new(strategy: Strategy, cfg: SearchConfig, weights: Weights) -> Self {
        Self::build(strategy, cfg, weights, RandomPolicy::from_entropy())
    }

    /// Like [`Bot::new`] but the random strategy draws from a seeded RNG.
    pub fn with_seed(strategy: Strategy, cfg: SearchConfig, weights: Weights, seed: u64) -> Self {
        Self::build(strategy, cfg, weights, RandomPolicy::seeded(seed))
    }

    fn build(strategy: Strategy, cfg: SearchConfig, weights: Weights, random: RandomPolicy) -> Self {
        let policy: Box<dyn Policy + Send> = match strategy {
            Strategy::Random => Box::new(random),
            Strategy::Greedy => Box::new(Greedy::new(weights)),
            Strategy::Expectimax => Box::new(Expectimax::with_config(cfg, weights)),
            Strategy::Enhanced => Box::new(EnhancedExpectimax::with_config(cfg, weights)),
        };
        Self { strategy, policy }
    }

    /// Next move for `board`; `None` means no legal move exists.
    pub fn choose_move(&mut self, board: Board) -> Option<Move> {
        let choice = self.policy.best_move(board);
        let stats = self.policy.last_stats();
        log::debug!(
            "{}: chose {:?} (depth {}, nodes {}, cache hit rate {:.1}%)",
            self.policy.name(),
            choice,
            stats.depth,
            stats.nodes,
            stats.cache_hit_rate() * 100.0
        );
        choice
    }

    #[inline]
    pub fn strategy(&self) -> Strategy { self.strategy }

    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.policy.last_stats() }
}

impl fmt::Debug for Bot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bot").field("strategy", &self.strategy).finish()
    }
}
