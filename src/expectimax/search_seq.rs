use crate::engine::{Board, Move};

use super::heuristic::{base_score, Weights};
use super::{pick_best, BranchEval, Policy, SearchConfig, SearchStats};

enum Node { Max, Chance }

/// Plain depth-limited expectimax.
///
/// Max nodes take the best legal move; chance nodes average over every empty
/// cell with a 2 (p = 0.9) or a 4 (p = 0.1). Leaves use [`base_score`].
pub struct Expectimax {
    cfg: SearchConfig,
    weights: Weights,
    stats: SearchStats,
}

impl Expectimax {
    pub fn new() -> Self { Self::with_config(SearchConfig::default(), Weights::default()) }

    pub fn with_config(cfg: SearchConfig, weights: Weights) -> Self {
        Self { cfg, weights, stats: SearchStats::default() }
    }

    /// Compute the best move using expectimax.
    ///
    /// Example
    /// ```
    /// use bot_2048::engine::Board;
    /// use bot_2048::expectimax::{Expectimax, SearchConfig, Weights};
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// let mut ex = Expectimax::with_config(SearchConfig { max_depth: 3, ..Default::default() }, Weights::default());
    /// assert!(ex.best_move(b).is_some());
    /// ```
    pub fn best_move(&mut self, board: Board) -> Option<Move> {
        let evals = self.branch_evals(board);
        pick_best(&evals, &Move::ALL)
    }

    /// Compute EV for each direction.
    ///
    /// Returns a fixed array in order: `[Up, Down, Left, Right]` and marks
    /// illegal moves as `legal=false`.
    pub fn branch_evals(&mut self, board: Board) -> [BranchEval; 4] {
        let depth = self.cfg.max_depth.max(1);
        let mut state_count = 0u64;
        let out = Move::ALL.map(|dir| {
            let next = board.apply(dir);
            if !next.moved {
                return BranchEval::illegal(dir);
            }
            let ev = self.expectimax(next.board, Node::Chance, depth - 1, &mut state_count);
            BranchEval { dir, ev, legal: true }
        });
        self.stats.nodes = state_count;
        self.stats.peak_nodes = self.stats.peak_nodes.max(state_count);
        self.stats.depth = depth;
        out
    }

    /// Statistics collected from the last call to [`Self::best_move`] or [`Self::branch_evals`].
    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    fn expectimax(&self, board: Board, node: Node, depth: u32, state_count: &mut u64) -> f64 {
        *state_count += 1;
        if depth == 0 || board.is_terminal() {
            return base_score(board, &self.weights);
        }
        match node {
            Node::Max => self.evaluate_max(board, depth, state_count),
            Node::Chance => self.evaluate_chance(board, depth, state_count),
        }
    }

    fn evaluate_max(&self, board: Board, depth: u32, state_count: &mut u64) -> f64 {
        let mut best_score = f64::NEG_INFINITY;
        for direction in Move::ALL {
            let next = board.apply(direction);
            if next.moved {
                let score = self.expectimax(next.board, Node::Chance, depth - 1, state_count);
                best_score = best_score.max(score);
            }
        }
        if best_score == f64::NEG_INFINITY { base_score(board, &self.weights) } else { best_score }
    }

    fn evaluate_chance(&self, board: Board, depth: u32, state_count: &mut u64) -> f64 {
        let cells = board.empty_cells();
        if cells.is_empty() {
            return base_score(board, &self.weights);
        }
        let score: f64 = cells
            .iter()
            .map(|&cell| {
                let with_2 = self.expectimax(board.with_tile(cell, 2), Node::Max, depth - 1, state_count);
                let with_4 = self.expectimax(board.with_tile(cell, 4), Node::Max, depth - 1, state_count);
                0.9 * with_2 + 0.1 * with_4
            })
            .sum();
        score / cells.len() as f64
    }
}

impl Default for Expectimax { fn default() -> Self { Self::new() } }

impl Policy for Expectimax {
    fn best_move(&mut self, board: Board) -> Option<Move> { Expectimax::best_move(self, board) }

    fn name(&self) -> &'static str { "expectimax" }

    fn last_stats(&self) -> SearchStats { self.stats }
}
