use crate::engine::{Board, Move};

use super::heuristic::{base_score, Weights};
use super::{pick_best, BranchEval, Policy, SearchStats};

/// One-ply lookahead: the move whose resulting board has the best base score.
pub struct Greedy {
    weights: Weights,
    stats: SearchStats,
}

impl Greedy {
    pub fn new(weights: Weights) -> Self { Self { weights, stats: SearchStats::default() } }

    /// Score of each move's resulting board, in `[Up, Down, Left, Right]` order.
    pub fn branch_evals(&mut self, board: Board) -> [BranchEval; 4] {
        self.stats.nodes = 0;
        self.stats.depth = 1;
        Move::ALL.map(|dir| {
            let out = board.apply(dir);
            if !out.moved {
                return BranchEval::illegal(dir);
            }
            self.stats.nodes += 1;
            BranchEval { dir, ev: base_score(out.board, &self.weights), legal: true }
        })
    }

    pub fn best_move(&mut self, board: Board) -> Option<Move> {
        let evals = self.branch_evals(board);
        self.stats.peak_nodes = self.stats.peak_nodes.max(self.stats.nodes);
        pick_best(&evals, &Move::ALL)
    }
}

impl Default for Greedy {
    fn default() -> Self { Self::new(Weights::default()) }
}

impl Policy for Greedy {
    fn best_move(&mut self, board: Board) -> Option<Move> { Greedy::best_move(self, board) }

    fn name(&self) -> &'static str { "greedy" }

    fn last_stats(&self) -> SearchStats { self.stats }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_the_merge() {
        // Left and right merge the two 4s and score the same; left is visited first.
        let b = Board::from_grid([[4, 4, 0, 0], [2, 0, 0, 0], [0; 4], [0; 4]]).unwrap();
        let mut greedy = Greedy::default();
        let evals = greedy.branch_evals(b);
        assert!(!evals[Move::Up.index()].legal);
        assert_eq!(evals[Move::Left.index()].ev, evals[Move::Right.index()].ev);
        assert!(evals[Move::Left.index()].ev > evals[Move::Down.index()].ev);
        assert_eq!(greedy.best_move(b), Some(Move::Left));
    }

    #[test]
    fn scores_negative_boards() {
        // All resulting boards score below -1; a legal move must still be returned.
        let weights = Weights { empty_tiles: -100.0, ..Weights::default() };
        let b = Board::from_grid([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        let mut greedy = Greedy::new(weights);
        assert!(greedy.best_move(b).is_some());
    }
}
