//! Board evaluation.
//!
//! Two scorers share the same terms: [`base_score`] (seven weighted terms,
//! used by greedy and plain expectimax) and [`enhanced_score`] (all nine
//! weighted terms plus merge, snake, corner-strategy and high-tile bonuses).
//! Every term works on tile values, not exponents.

use serde::{Deserialize, Serialize};

use crate::engine::{Board, Cell, Grid};

const MERGE_BONUS: f64 = 1.5;
const SNAKE_BONUS: f64 = 2.0;
const CORNER_STRATEGY_BONUS: f64 = 15.0;
const HIGH_TILE_BONUS: f64 = 2.0;

/// Rows and columns of interest for each corner: `(row, col, row_step, col_step)`.
const CORNERS: [(usize, usize, isize, isize); 4] = [(0, 0, 1, 1), (0, 3, 1, -1), (3, 0, -1, 1), (3, 3, -1, -1)];

/// Coefficients of the weighted evaluation terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub empty_tiles: f64,
    pub smoothness: f64,
    pub monotonicity: f64,
    pub max_tile: f64,
    pub corner_bonus: f64,
    pub edge_bonus: f64,
    pub clustering: f64,
    pub gradient_bonus: f64,
    pub trap_avoidance: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            empty_tiles: 20.0,
            smoothness: 0.5,
            monotonicity: 18.0,
            max_tile: 3.0,
            corner_bonus: 35.0,
            edge_bonus: 6.0,
            clustering: 2.0,
            gradient_bonus: 10.0,
            trap_avoidance: 1.5,
        }
    }
}

impl Weights {
    /// Name of the first coefficient that is NaN or infinite, if any.
    pub fn non_finite(&self) -> Option<&'static str> {
        [
            ("empty_tiles", self.empty_tiles),
            ("smoothness", self.smoothness),
            ("monotonicity", self.monotonicity),
            ("max_tile", self.max_tile),
            ("corner_bonus", self.corner_bonus),
            ("edge_bonus", self.edge_bonus),
            ("clustering", self.clustering),
            ("gradient_bonus", self.gradient_bonus),
            ("trap_avoidance", self.trap_avoidance),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

/// Seven-term weighted evaluation.
pub fn base_score(board: Board, w: &Weights) -> f64 { weighted_terms(&board.to_grid(), w) }

/// Nine weighted terms plus the fixed bonuses.
///
/// Pure: the same board always yields the same score.
pub fn enhanced_score(board: Board, w: &Weights) -> f64 {
    let g = board.to_grid();
    let weighted = weighted_terms(&g, w)
        + w.gradient_bonus * gradient_bonus(&g)
        + w.trap_avoidance * trap_avoidance(&g);
    weighted
        + merge_opportunities(&g) * MERGE_BONUS
        + snake_pattern(&g) * SNAKE_BONUS
        + corner_strategy(&g) * CORNER_STRATEGY_BONUS
        + high_tile_bonus(&g) * HIGH_TILE_BONUS
}

fn weighted_terms(g: &Grid, w: &Weights) -> f64 {
    w.empty_tiles * empty_tiles(g)
        + w.smoothness * smoothness(g)
        + w.monotonicity * monotonicity(g)
        + w.max_tile * log2(max_tile(g).max(1))
        + w.corner_bonus * corner_bonus(g)
        + w.edge_bonus * edge_bonus(g)
        + w.clustering * clustering(g)
}

#[inline]
fn log2(v: u32) -> f64 { (v as f64).log2() }

#[inline]
fn cells() -> impl Iterator<Item = Cell> { (0..16).map(|idx| Cell::new(idx / 4, idx % 4)) }

#[inline]
fn at(g: &Grid, cell: Cell) -> u32 { g[cell.row][cell.col] }

/// Orthogonal neighbours in up, down, left, right order.
pub(crate) fn neighbours(cell: Cell) -> impl Iterator<Item = Cell> {
    [(-1, 0), (1, 0), (0, -1), (0, 1)].into_iter().filter_map(move |(dr, dc): (isize, isize)| {
        let row = cell.row.checked_add_signed(dr)?;
        let col = cell.col.checked_add_signed(dc)?;
        (row < 4 && col < 4).then_some(Cell::new(row, col))
    })
}

pub(crate) fn max_tile(g: &Grid) -> u32 { g.iter().flatten().copied().max().unwrap_or(0) }

/// Non-empty tile values, largest first.
fn sorted_tiles(g: &Grid) -> Vec<u32> {
    let mut tiles: Vec<u32> = g.iter().flatten().copied().filter(|&v| v > 0).collect();
    tiles.sort_unstable_by(|a, b| b.cmp(a));
    tiles
}

pub(crate) fn empty_tiles(g: &Grid) -> f64 { g.iter().flatten().filter(|&&v| v == 0).count() as f64 }

pub(crate) fn smoothness(g: &Grid) -> f64 {
    let mut smoothness = 0.0;
    for row in 0..4 {
        for col in 0..4 {
            let value = g[row][col];
            if value == 0 {
                continue;
            }
            if col < 3 && g[row][col + 1] != 0 {
                smoothness -= (log2(value) - log2(g[row][col + 1])).abs();
            }
            if row < 3 && g[row + 1][col] != 0 {
                smoothness -= (log2(value) - log2(g[row + 1][col])).abs();
            }
        }
    }
    smoothness
}

#[inline]
fn monotonicity_step(prev: u32, current: u32) -> f64 {
    if prev >= current && prev > 0 {
        prev as f64
    } else if current > 0 {
        -(current as f64)
    } else {
        0.0
    }
}

fn walk(start: usize, step: isize) -> [usize; 4] {
    if step > 0 { [0, 1, 2, 3] } else { [start, start - 1, start - 2, start - 3] }
}

/// Best corner-anchored monotonicity; never below zero.
pub(crate) fn monotonicity(g: &Grid) -> f64 {
    CORNERS.iter().fold(0.0, |best: f64, &(row, col, row_step, col_step)| {
        let rows = walk(row, row_step);
        let cols = walk(col, col_step);
        let mut score = 0.0;
        for &r in &rows {
            score += cols.windows(2).map(|p| monotonicity_step(g[r][p[0]], g[r][p[1]])).sum::<f64>();
        }
        for &c in &cols {
            score += rows.windows(2).map(|p| monotonicity_step(g[p[0]][c], g[p[1]][c])).sum::<f64>();
        }
        best.max(score)
    })
}

pub(crate) fn corner_bonus(g: &Grid) -> f64 {
    let max = max_tile(g);
    let second = sorted_tiles(g).get(1).copied().unwrap_or(0);
    let mut bonus = 0.0;
    for cell in cells().filter(|c| c.is_corner() && at(g, *c) == max) {
        bonus += max as f64 * 10.0;
        bonus += neighbours(cell).filter(|n| at(g, *n) == second).count() as f64 * second as f64 * 2.0;
    }
    bonus
}

pub(crate) fn edge_bonus(g: &Grid) -> f64 {
    let tiles = sorted_tiles(g);
    cells()
        .filter(|c| c.is_edge() && at(g, *c) > 0)
        .filter_map(|c| {
            let value = at(g, c);
            let rank = tiles.iter().position(|&t| t == value)?;
            (rank < 6).then(|| value as f64 * (6 - rank) as f64 * 0.5)
        })
        .sum()
}

/// Penalises tiles >= 32 with no neighbour of at least half their value.
pub(crate) fn clustering(g: &Grid) -> f64 {
    cells()
        .filter(|c| at(g, *c) >= 32)
        .filter(|c| {
            let value = at(g, *c) as f64;
            !neighbours(*c).any(|n| at(g, n) > 0 && at(g, n) as f64 >= value / 2.0)
        })
        .map(|c| -(at(g, c) as f64))
        .sum()
}

pub(crate) fn gradient_bonus(g: &Grid) -> f64 {
    CORNERS.iter().fold(0.0, |best: f64, &(row, col, row_step, col_step)| {
        let mut prev = g[row][col];
        if prev == 0 {
            return best;
        }
        let mut score = 0.0;
        for i in 1..4 {
            let r = (row as isize + row_step * i) as usize;
            let c = (col as isize + col_step * i) as usize;
            let current = g[r][c];
            if current == 0 || prev < current {
                break;
            }
            score += prev as f64;
            prev = current;
        }
        best.max(score)
    })
}

/// Neighbours that are empty or hold the same value.
fn mobility(g: &Grid, cell: Cell) -> usize {
    let value = at(g, cell);
    neighbours(cell).filter(|n| at(g, *n) == 0 || at(g, *n) == value).count()
}

pub(crate) fn trap_avoidance(g: &Grid) -> f64 {
    let half_max = max_tile(g) as f64 / 2.0;
    let mut penalty = 0.0;
    for cell in cells() {
        let value = at(g, cell);
        if value <= 128 || (value as f64) < half_max {
            continue;
        }
        match mobility(g, cell) {
            0 => penalty -= log2(value),
            1 => penalty -= log2(value) * 0.25,
            _ => {}
        }
    }
    penalty
}

pub(crate) fn merge_opportunities(g: &Grid) -> f64 {
    let total: f64 = cells()
        .filter(|c| at(g, *c) > 0)
        .map(|c| {
            let value = at(g, c);
            neighbours(c).filter(|n| at(g, *n) == value).count() as f64 * value as f64
        })
        .sum();
    total / 2.0
}

/// Sum of every row whose adjacent non-empty pairs never increase left to right.
pub(crate) fn snake_pattern(g: &Grid) -> f64 {
    g.iter()
        .filter(|row| row.windows(2).all(|p| p[0] == 0 || p[1] == 0 || p[0] >= p[1]))
        .map(|row| row.iter().map(|&v| v as f64).sum::<f64>())
        .sum()
}

pub(crate) fn corner_strategy(g: &Grid) -> f64 {
    let max = max_tile(g);
    cells()
        .filter(|c| c.is_corner() && at(g, *c) == max)
        .map(|c| max as f64 * 5.0 + corner_build_up(g, c))
        .sum()
}

fn corner_build_up(g: &Grid, corner: Cell) -> f64 {
    const RATIOS: [f64; 3] = [0.5, 0.25, 0.125];
    let max = at(g, corner) as f64;
    neighbours(corner)
        .map(|n| at(g, n) as f64)
        .filter(|&v| v > 0.0)
        .filter(|&v| RATIOS.iter().any(|r| (v - max * r).abs() < max * r * 0.1))
        .sum()
}

pub(crate) fn high_tile_bonus(g: &Grid) -> f64 {
    sorted_tiles(g)
        .iter()
        .take(6)
        .enumerate()
        .filter(|&(_, &v)| v >= 32)
        .map(|(i, &v)| log2(v) * (6 - i) as f64)
        .sum()
}
