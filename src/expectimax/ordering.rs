//! Move ordering and chance-cell ranking for the enhanced search.

use crate::engine::{Board, Cell, Move};

const BOTTOM_RIGHT: [Move; 4] = [Move::Down, Move::Right, Move::Left, Move::Up];
const BOTTOM_LEFT: [Move; 4] = [Move::Down, Move::Left, Move::Right, Move::Up];
const TOP_RIGHT: [Move; 4] = [Move::Up, Move::Right, Move::Left, Move::Down];
const TOP_LEFT: [Move; 4] = [Move::Up, Move::Left, Move::Right, Move::Down];

/// Order in which to explore moves so the max tile stays in (or heads for) a corner.
///
/// If a max tile sits in a corner, that corner's pattern wins; otherwise the
/// quadrant of the first max tile (row-major) picks the nearest corner.
pub fn move_order(board: Board) -> [Move; 4] {
    let max = board.highest_tile();
    if max == 0 {
        return BOTTOM_RIGHT;
    }
    let max_cells: Vec<Cell> = (0..16)
        .map(|idx| Cell::new(idx / 4, idx % 4))
        .filter(|c| board.get(c.row, c.col) == max)
        .collect();
    if let Some(corner) = max_cells.iter().find(|c| c.is_corner()) {
        return corner_order(*corner);
    }
    match max_cells.first() {
        Some(c) if c.row >= 2 && c.col >= 2 => BOTTOM_RIGHT,
        Some(c) if c.row >= 2 => BOTTOM_LEFT,
        Some(c) if c.col >= 2 => TOP_RIGHT,
        Some(_) => TOP_LEFT,
        None => BOTTOM_RIGHT,
    }
}

fn corner_order(corner: Cell) -> [Move; 4] {
    match (corner.row, corner.col) {
        (3, 3) => BOTTOM_RIGHT,
        (3, 0) => BOTTOM_LEFT,
        (0, 3) => TOP_RIGHT,
        (0, 0) => TOP_LEFT,
        _ => BOTTOM_RIGHT,
    }
}

/// Spawn-cell priority: corners 10, other edge cells 5, interior 0.
#[inline]
pub fn cell_value(cell: Cell) -> u8 {
    if cell.is_corner() {
        10
    } else if cell.is_edge() {
        5
    } else {
        0
    }
}

/// Empty cells sorted by [`cell_value`], highest first; ties keep row-major order.
pub fn ranked_empty_cells(board: Board) -> Vec<Cell> {
    let mut cells = board.empty_cells();
    cells.sort_by(|a, b| cell_value(*b).cmp(&cell_value(*a)));
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(cell: Cell, value: u32) -> Board { Board::EMPTY.with_tile(Cell::new(1, 1), 2).with_tile(cell, value) }

    #[test]
    fn corner_orders() {
        assert_eq!(move_order(board_with(Cell::new(3, 3), 64)), [Move::Down, Move::Right, Move::Left, Move::Up]);
        assert_eq!(move_order(board_with(Cell::new(3, 0), 64)), [Move::Down, Move::Left, Move::Right, Move::Up]);
        assert_eq!(move_order(board_with(Cell::new(0, 3), 64)), [Move::Up, Move::Right, Move::Left, Move::Down]);
        assert_eq!(move_order(board_with(Cell::new(0, 0), 64)), [Move::Up, Move::Left, Move::Right, Move::Down]);
    }

    #[test]
    fn quadrant_orders() {
        assert_eq!(move_order(board_with(Cell::new(2, 2), 64)), BOTTOM_RIGHT);
        assert_eq!(move_order(board_with(Cell::new(3, 1), 64)), BOTTOM_LEFT);
        assert_eq!(move_order(board_with(Cell::new(1, 3), 64)), TOP_RIGHT);
        assert_eq!(move_order(board_with(Cell::new(0, 1), 64)), TOP_LEFT);
        assert_eq!(move_order(Board::EMPTY), BOTTOM_RIGHT);
    }

    #[test]
    fn corner_beats_earlier_non_corner() {
        // Max tile at (0,1) comes first in row-major order, but (3,0) is a corner.
        let b = Board::EMPTY.with_tile(Cell::new(0, 1), 128).with_tile(Cell::new(3, 0), 128);
        assert_eq!(move_order(b), BOTTOM_LEFT);
    }

    #[test]
    fn empty_cells_ranked() {
        let b = Board::from_grid([[2, 0, 2, 0], [0, 0, 2, 2], [2, 2, 2, 2], [2, 2, 2, 2]]).unwrap();
        assert_eq!(
            ranked_empty_cells(b),
            vec![Cell::new(0, 3), Cell::new(0, 1), Cell::new(1, 0), Cell::new(1, 1)]
        );
    }
}
