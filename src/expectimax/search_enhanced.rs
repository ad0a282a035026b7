use crate::engine::{Board, Move};

use super::cache::{CacheKey, Ply, SearchCache};
use super::heuristic::{enhanced_score, Weights};
use super::ordering::{move_order, ranked_empty_cells};
use super::{pick_best, BranchEval, Policy, SearchConfig, SearchStats};

const LATE_GAME_MAX_TILE: u32 = 1024;
const CROWDED_EMPTY: usize = 4;
const NEARLY_FULL_EMPTY: usize = 2;
const DEEP_CAP: u32 = 7;
const NEARLY_FULL_CAP: u32 = 6;

/// Expectimax tuned for play strength.
///
/// Compared to [`super::Expectimax`]:
/// - player nodes carry an `(alpha, beta)` window and stop once `beta <= alpha`;
/// - moves are explored corner-first (see [`move_order`]);
/// - chance nodes look at a handful of the most valuable empty cells and
///   average over that subset only;
/// - every evaluated subtree is memoised by `(board, depth, ply)`;
/// - depth grows on crowded late-game boards;
/// - leaves are scored with [`enhanced_score`].
pub struct EnhancedExpectimax {
    cfg: SearchConfig,
    weights: Weights,
    cache: SearchCache,
    stats: SearchStats,
}

impl EnhancedExpectimax {
    pub fn new() -> Self { Self::with_config(SearchConfig::default(), Weights::default()) }

    pub fn with_config(cfg: SearchConfig, weights: Weights) -> Self {
        let cache = SearchCache::with_capacity(cfg.cache_capacity);
        Self { cfg, weights, cache, stats: SearchStats::default() }
    }

    /// Depth the next search on `board` will use.
    ///
    /// ```
    /// use bot_2048::engine::Board;
    /// use bot_2048::expectimax::EnhancedExpectimax;
    /// let crowded = Board::from_grid([[1024, 2, 4, 8], [2, 4, 8, 16], [4, 8, 16, 0], [8, 16, 0, 0]]).unwrap();
    /// assert_eq!(EnhancedExpectimax::new().search_depth(crowded), 7);
    /// ```
    pub fn search_depth(&self, board: Board) -> u32 {
        let base = self.cfg.max_depth.max(1);
        let empty = board.count_empty();
        if board.highest_tile() >= LATE_GAME_MAX_TILE && empty <= CROWDED_EMPTY {
            (base + 2).min(DEEP_CAP)
        } else if empty <= NEARLY_FULL_EMPTY {
            (base + 1).min(NEARLY_FULL_CAP)
        } else {
            base
        }
    }

    pub fn best_move(&mut self, board: Board) -> Option<Move> {
        let evals = self.branch_evals(board);
        pick_best(&evals, &move_order(board))
    }

    /// Root value of each direction, in `[Up, Down, Left, Right]` order.
    ///
    /// Branches are searched in [`move_order`] so that the cache warms up on
    /// the preferred line first.
    pub fn branch_evals(&mut self, board: Board) -> [BranchEval; 4] {
        let depth = self.search_depth(board);
        self.stats.nodes = 0;
        self.stats.depth = depth;
        let mut out = Move::ALL.map(BranchEval::illegal);
        for dir in move_order(board) {
            let next = board.apply(dir);
            if !next.moved {
                continue;
            }
            let ev = self.search(next.board, depth - 1, Ply::Chance, f64::NEG_INFINITY, f64::INFINITY);
            out[dir.index()] = BranchEval { dir, ev, legal: true };
        }
        self.stats.peak_nodes = self.stats.peak_nodes.max(self.stats.nodes);
        self.stats.cache_hits = self.cache.hits();
        self.stats.cache_misses = self.cache.misses();
        log::trace!("enhanced search: depth {depth}, {} nodes, {} cached", self.stats.nodes, self.cache.len());
        out
    }

    pub fn clear_cache(&mut self) { self.cache.clear(); }

    #[inline]
    pub fn cache_len(&self) -> usize { self.cache.len() }

    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    fn search(&mut self, board: Board, depth: u32, ply: Ply, alpha: f64, beta: f64) -> f64 {
        self.stats.nodes += 1;
        let key = CacheKey { board, depth, ply };
        if let Some(score) = self.cache.get(&key) {
            return score;
        }
        let score = if depth == 0 || board.is_terminal() {
            enhanced_score(board, &self.weights)
        } else {
            match ply {
                Ply::Player => self.player_node(board, depth, alpha, beta),
                Ply::Chance => self.chance_node(board, depth, alpha, beta),
            }
        };
        self.cache.insert(key, score);
        score
    }

    fn player_node(&mut self, board: Board, depth: u32, mut alpha: f64, beta: f64) -> f64 {
        let mut best = f64::NEG_INFINITY;
        for dir in move_order(board) {
            let next = board.apply(dir);
            if !next.moved {
                continue;
            }
            let score = self.search(next.board, depth - 1, Ply::Chance, alpha, beta);
            best = best.max(score);
            alpha = alpha.max(score);
            // Chance nodes pass beta through untouched, so from the root it stays +inf.
            if beta <= alpha {
                break;
            }
        }
        if best == f64::NEG_INFINITY { enhanced_score(board, &self.weights) } else { best }
    }

    fn chance_node(&mut self, board: Board, depth: u32, alpha: f64, beta: f64) -> f64 {
        let mut cells = ranked_empty_cells(board);
        if cells.is_empty() {
            return enhanced_score(board, &self.weights);
        }
        let limit = if board.highest_tile() >= self.cfg.late_game_tile {
            self.cfg.late_game_chance_cells
        } else {
            self.cfg.chance_cells
        };
        cells.truncate(limit.max(1));

        let mut total = 0.0;
        for &cell in &cells {
            let with_2 = self.search(board.with_tile(cell, 2), depth - 1, Ply::Player, alpha, beta);
            let with_4 = self.search(board.with_tile(cell, 4), depth - 1, Ply::Player, alpha, beta);
            total += 0.9 * with_2 + 0.1 * with_4;
        }
        total / cells.len() as f64
    }
}

impl Default for EnhancedExpectimax {
    fn default() -> Self { Self::new() }
}

impl Policy for EnhancedExpectimax {
    fn best_move(&mut self, board: Board) -> Option<Move> { EnhancedExpectimax::best_move(self, board) }

    fn name(&self) -> &'static str { "enhanced" }

    fn last_stats(&self) -> SearchStats { self.stats }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_depth(depth: u32) -> EnhancedExpectimax {
        let cfg = SearchConfig { max_depth: depth, ..SearchConfig::default() };
        EnhancedExpectimax::with_config(cfg, Weights::default())
    }

    fn opening() -> Board { Board::from_grid([[2, 0, 0, 0], [0, 4, 0, 0], [0; 4], [0, 0, 0, 2]]).unwrap() }

    #[test]
    fn adaptive_depth() {
        let ex = EnhancedExpectimax::new();
        // Max tile 1024 with exactly three empty cells.
        let late = Board::from_grid([[1024, 2, 4, 8], [2, 4, 8, 16], [4, 8, 16, 32], [8, 0, 0, 0]]).unwrap();
        assert_eq!(late.count_empty(), 3);
        assert_eq!(ex.search_depth(late), 7);

        let nearly_full = Board::from_grid([[256, 2, 4, 8], [2, 4, 8, 16], [4, 8, 16, 32], [8, 16, 0, 0]]).unwrap();
        assert_eq!(ex.search_depth(nearly_full), 6);

        // 1024 on a roomy board keeps the base depth.
        let roomy = Board::from_grid([[1024, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 2]]).unwrap();
        assert_eq!(ex.search_depth(roomy), 5);

        // The caps bound a deeper configured base too.
        assert_eq!(with_depth(9).search_depth(late), 7);
        assert_eq!(with_depth(9).search_depth(nearly_full), 6);
        assert_eq!(with_depth(9).search_depth(roomy), 9);
    }

    #[test]
    fn cached_search_matches_fresh_search() {
        let b = opening();
        let mut warm = with_depth(3);
        let first = warm.branch_evals(b);
        assert!(warm.cache_len() > 0);
        let second = warm.branch_evals(b);
        assert!(warm.last_stats().cache_hits > 0);

        let mut fresh = with_depth(3);
        let reference = fresh.branch_evals(b);
        for ((a, c), r) in first.iter().zip(second.iter()).zip(reference.iter()) {
            assert_eq!(a.legal, r.legal);
            assert!((a.ev - r.ev).abs() < 1e-9);
            assert!((c.ev - r.ev).abs() < 1e-9);
        }
    }

    #[test]
    fn tiny_cache_still_agrees() {
        let b = opening();
        let mut small = EnhancedExpectimax::with_config(
            SearchConfig { max_depth: 3, cache_capacity: 16, ..SearchConfig::default() },
            Weights::default(),
        );
        let mut big = with_depth(3);
        let small_evals = small.branch_evals(b);
        assert!(small.cache_len() <= 16);
        for (s, l) in small_evals.iter().zip(big.branch_evals(b).iter()) {
            assert!((s.ev - l.ev).abs() < 1e-9);
        }
    }

    #[test]
    fn clear_cache_empties() {
        let mut ex = with_depth(2);
        ex.best_move(opening());
        assert!(ex.cache_len() > 0);
        ex.clear_cache();
        assert_eq!(ex.cache_len(), 0);
    }

    #[test]
    fn chance_node_averages_over_subset() {
        // 64 < late_game_tile, so up to six cells; only two are empty here.
        let b = Board::from_grid([[2, 4, 8, 16], [16, 8, 4, 2], [2, 4, 8, 16], [64, 8, 0, 0]]).unwrap();
        let mut ex = with_depth(2);
        let got = ex.search(b, 1, Ply::Chance, f64::NEG_INFINITY, f64::INFINITY);
        let w = Weights::default();
        let expected = ranked_empty_cells(b)
            .iter()
            .map(|&c| 0.9 * enhanced_score(b.with_tile(c, 2), &w) + 0.1 * enhanced_score(b.with_tile(c, 4), &w))
            .sum::<f64>()
            / 2.0;
        assert!((got - expected).abs() < 1e-9);
    }

    #[test]
    fn player_node_cuts_on_finite_beta() {
        let b = opening();
        let first = move_order(b).into_iter().find(|&dir| b.apply(dir).moved).unwrap();
        let mut ex = with_depth(2);
        let cut = ex.player_node(b, 1, f64::NEG_INFINITY, f64::NEG_INFINITY);
        assert_eq!(ex.stats.nodes, 1);
        assert_eq!(cut, enhanced_score(b.apply(first).board, &Weights::default()));

        let mut full = with_depth(2);
        let best = full.player_node(b, 1, f64::NEG_INFINITY, f64::INFINITY);
        assert_eq!(full.stats.nodes, b.available_moves().len() as u64);
        assert!(best >= cut);
    }

    #[test]
    fn late_game_limits_chance_cells() {
        let b = Board::from_grid([[512, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        let mut ex = with_depth(2);
        ex.search(b, 1, Ply::Chance, f64::NEG_INFINITY, f64::INFINITY);
        // One chance node plus two children for each of four cells.
        assert_eq!(ex.stats.nodes, 1 + 4 * 2);
    }
}
