use rand::Rng;
use std::fmt;
use std::sync::OnceLock;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// Canonical iteration order, also used for tie-breaking.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Position in [`Move::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Move::Up => 0,
            Move::Down => 1,
            Move::Left => 2,
            Move::Right => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Largest tile a 4-bit exponent can hold.
pub const MAX_TILE: u32 = 1 << MAX_EXPONENT;

const MAX_EXPONENT: u64 = 15;

const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

struct Stores {
    shift_left: Box<[u64]>,
    shift_right: Box<[u64]>,
    shift_up: Box<[u64]>,
    shift_down: Box<[u64]>,
    merge_left: Box<[u32]>,
    merge_right: Box<[u32]>,
}

type BoardRaw = u64;
type Line = u64;

/// Tile values in row-major order, `0` for empty cells.
pub type Grid = [[u32; 4]; 4];

/// A board position. Row 0 is the top row, column 0 the leftmost column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self { Cell { row, col } }

    #[inline]
    pub fn is_corner(self) -> bool { (self.row == 0 || self.row == 3) && (self.col == 0 || self.col == 3) }

    #[inline]
    pub fn is_edge(self) -> bool { self.row == 0 || self.row == 3 || self.col == 0 || self.col == 3 }

    #[inline]
    fn index(self) -> usize { self.row * 4 + self.col }
}

/// Result of sliding a board in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Board after the slide. Equal to the input when `moved` is false.
    pub board: Board,
    /// True iff at least one line changed.
    pub moved: bool,
    /// Sum of the values of every tile created by a merge.
    pub score: u32,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("tile {value} at ({row}, {col}) is not a power of two >= 2")]
    NotPowerOfTwo { row: usize, col: usize, value: u32 },
    #[error("tile {value} at ({row}, {col}) exceeds the largest tile {max}", max = MAX_TILE)]
    TooLarge { row: usize, col: usize, value: u32 },
}

/// Packed 4x4 2048 board as 16 4-bit exponents in a `u64`.
///
/// Nibble `i` (counting from the most significant end) holds the cell at
/// row-major index `i`; `0` is an empty cell and `e` is the tile `2^e`.
/// `Board` is `Copy`, so every simulated move works on its own instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self { Board(raw) }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw { self.0 }

    /// Build a board from tile values.
    ///
    /// ```
    /// use bot_2048::engine::Board;
    /// let b = Board::from_grid([[2, 0, 0, 0], [0, 4, 0, 0], [0, 0, 0, 0], [0, 0, 0, 2048]]).unwrap();
    /// assert_eq!(b.get(3, 3), 2048);
    /// assert!(Board::from_grid([[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    /// ```
    pub fn from_grid(grid: Grid) -> Result<Self, BoardError> {
        let mut raw = 0;
        for (row, values) in grid.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if value == 0 {
                    continue;
                }
                if value == 1 || !value.is_power_of_two() {
                    return Err(BoardError::NotPowerOfTwo { row, col, value });
                }
                if value > MAX_TILE {
                    return Err(BoardError::TooLarge { row, col, value });
                }
                raw |= (value.trailing_zeros() as u64) << (60 - 4 * (row * 4 + col));
            }
        }
        Ok(Board(raw))
    }

    /// Tile values in row-major order.
    pub fn to_grid(self) -> Grid {
        let mut grid = [[0u32; 4]; 4];
        for (idx, slot) in grid.iter_mut().flatten().enumerate() {
            *slot = exponent_to_value(self.exponent(idx));
        }
        grid
    }

    /// Tile value at (`row`, `col`), 0 if empty.
    #[inline]
    pub fn get(self, row: usize, col: usize) -> u32 { exponent_to_value(self.exponent(row * 4 + col)) }

    #[inline]
    fn exponent(self, idx: usize) -> u64 { (self.0 >> (60 - 4 * idx)) & 0xf }

    /// Slide/merge tiles in `dir`, reporting whether anything moved and the merge score.
    ///
    /// ```
    /// use bot_2048::engine::{Board, Move};
    /// let b = Board::from_grid([[2, 2, 4, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// let out = b.apply(Move::Left);
    /// assert!(out.moved);
    /// assert_eq!(out.score, 4);
    /// assert_eq!(out.board.to_grid()[0], [4, 4, 0, 0]);
    /// ```
    #[inline]
    pub fn apply(self, dir: Move) -> MoveOutcome {
        let (board, score) = match dir {
            Move::Left | Move::Right => shift_rows(self, dir),
            Move::Up | Move::Down => shift_cols(self, dir),
        };
        if board == self {
            MoveOutcome { board: self, moved: false, score: 0 }
        } else {
            MoveOutcome { board, moved: true, score }
        }
    }

    /// Return the board resulting from sliding/merging tiles in `dir` (no random insert).
    #[inline]
    pub fn shift(self, dir: Move) -> Self { self.apply(dir).board }

    /// Moves that change the board, in `[Up, Down, Left, Right]` order.
    pub fn available_moves(self) -> Vec<Move> {
        Move::ALL.into_iter().filter(|&dir| self.apply(dir).moved).collect()
    }

    /// True iff no cell is empty and no two orthogonal neighbours can merge.
    ///
    /// ```
    /// use bot_2048::engine::Board;
    /// assert!(!Board::EMPTY.is_terminal());
    /// let full = Board::from_grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]).unwrap();
    /// assert!(full.is_terminal());
    /// ```
    pub fn is_terminal(self) -> bool {
        if self.count_empty() > 0 {
            return false;
        }
        for row in 0..4 {
            for col in 0..4 {
                let e = self.exponent(row * 4 + col);
                // Two largest tiles cannot merge, see `slide_packed`.
                if e == MAX_EXPONENT {
                    continue;
                }
                if row < 3 && e == self.exponent((row + 1) * 4 + col) {
                    return false;
                }
                if col < 3 && e == self.exponent(row * 4 + col + 1) {
                    return false;
                }
            }
        }
        true
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(self) -> Vec<Cell> {
        (0..16)
            .filter(|&idx| self.exponent(idx) == 0)
            .map(|idx| Cell::new(idx / 4, idx % 4))
            .collect()
    }

    /// Place `value` at `cell`, overwriting whatever was there.
    ///
    /// `value` must be a power of two between 2 and [`MAX_TILE`].
    #[inline]
    pub fn with_tile(self, cell: Cell, value: u32) -> Self {
        debug_assert!(value >= 2 && value <= MAX_TILE && value.is_power_of_two());
        let shift = 60 - 4 * cell.index();
        let cleared = self.0 & !(0xf << shift);
        Board(cleared | ((value.trailing_zeros() as u64) << shift))
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty slot, using the provided RNG.
    ///
    /// A full board is returned unchanged.
    ///
    /// ```
    /// use bot_2048::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let cells = self.empty_cells();
        if cells.is_empty() {
            return self;
        }
        let cell = cells[rng.gen_range(0..cells.len())];
        self.with_tile(cell, generate_random_tile(rng))
    }

    /// Return the highest tile value (e.g., 2048) present on the board, 0 if empty.
    #[inline]
    pub fn highest_tile(self) -> u32 {
        let max = (0..16).map(|idx| self.exponent(idx)).max().unwrap_or(0);
        exponent_to_value(max)
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> usize { 16 - count_non_empty(self) }

    /// Sum of all tile values.
    pub fn sum_tiles(self) -> u64 { (0..16).map(|idx| exponent_to_value(self.exponent(idx)) as u64).sum() }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.to_grid();
        for (row_idx, row) in grid.iter().enumerate() {
            if row_idx > 0 {
                writeln!(f, "-------------------------------")?;
            }
            let cells: Vec<String> = row.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

/// Initialize internal tables on first use. Safe to call multiple times.
pub fn new() {
    STORES.get_or_init(create_stores);
}

/// Free-function form of [`Board::apply`].
#[inline]
pub fn apply_move(board: Board, dir: Move) -> MoveOutcome { board.apply(dir) }

/// Slide one line towards index 0.
///
/// Zeros are squeezed out, then a single left-to-right pass merges each adjacent
/// equal pair into one tile of double value. A tile produced by a merge does not
/// merge again in the same call. Returns the new line and the sum of merged values.
///
/// ```
/// use bot_2048::engine::slide_line;
/// assert_eq!(slide_line([2, 2, 2, 2]), ([4, 4, 0, 0], 8));
/// assert_eq!(slide_line([0, 4, 0, 4]), ([8, 0, 0, 0], 8));
/// ```
pub fn slide_line(line: [u32; 4]) -> ([u32; 4], u32) { slide_line_capped(line, u32::MAX) }

/// `slide_line` where a pair only merges if the result stays within `limit`.
fn slide_line_capped(line: [u32; 4], limit: u32) -> ([u32; 4], u32) {
    let mut out = [0u32; 4];
    let mut gained = 0;
    let mut len = 0;
    let mut pending: Option<u32> = None;
    for val in line.into_iter().filter(|&v| v != 0) {
        match pending {
            Some(prev) if prev == val && prev <= limit / 2 => {
                out[len] = prev * 2;
                gained += prev * 2;
                len += 1;
                pending = None;
            }
            Some(prev) => {
                out[len] = prev;
                len += 1;
                pending = Some(val);
            }
            None => pending = Some(val),
        }
    }
    if let Some(prev) = pending {
        out[len] = prev;
    }
    (out, gained)
}

// Credit to Nneonneo
pub(crate) fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

pub(crate) fn extract_line(board: BoardRaw, line_idx: u64) -> Line {
    (board >> ((3 - line_idx) * 16)) & 0xffff
}

static STORES: OnceLock<Stores> = OnceLock::new();

fn create_stores() -> Stores {
    // Allocate on the heap to avoid large stack frames
    let mut shift_left = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_right = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_up = vec![0u64; LINE_TABLE_SIZE];
    let mut shift_down = vec![0u64; LINE_TABLE_SIZE];
    let mut merge_left = vec![0u32; LINE_TABLE_SIZE];
    let mut merge_right = vec![0u32; LINE_TABLE_SIZE];

    for val in 0..LINE_TABLE_SIZE {
        let line = val as Line;
        let (left, left_score) = slide_packed(line, false);
        let (right, right_score) = slide_packed(line, true);
        shift_left[val] = left;
        shift_right[val] = right;
        shift_up[val] = row_to_col(left);
        shift_down[val] = row_to_col(right);
        merge_left[val] = left_score;
        merge_right[val] = right_score;
    }

    Stores {
        shift_left: shift_left.into_boxed_slice(),
        shift_right: shift_right.into_boxed_slice(),
        shift_up: shift_up.into_boxed_slice(),
        shift_down: shift_down.into_boxed_slice(),
        merge_left: merge_left.into_boxed_slice(),
        merge_right: merge_right.into_boxed_slice(),
    }
}

#[inline(always)]
fn stores() -> &'static Stores { STORES.get_or_init(create_stores) }

/// Table entry for one packed line. `reverse` slides towards the high index.
fn slide_packed(line: Line, reverse: bool) -> (Line, u32) {
    let mut values = [0u32; 4];
    for (i, slot) in values.iter_mut().enumerate() {
        *slot = exponent_to_value((line >> ((3 - i) * 4)) & 0xf);
    }
    if reverse {
        values.reverse();
    }
    // Two 32768 tiles cannot merge: the result does not fit in a nibble.
    let (mut out, gained) = slide_line_capped(values, MAX_TILE);
    if reverse {
        out.reverse();
    }
    let packed = out
        .iter()
        .fold(0, |acc, &v| (acc << 4) | if v == 0 { 0 } else { v.trailing_zeros() as Line });
    (packed, gained)
}

fn row_to_col(row: Line) -> Line {
    (row >> 12 & 0xf) << 48 | (row >> 8 & 0xf) << 32 | (row >> 4 & 0xf) << 16 | (row & 0xf)
}

fn shift_rows(board: Board, move_dir: Move) -> (Board, u32) {
    let s = stores();
    let (table, merges): (&[u64], &[u32]) = match move_dir {
        Move::Left => (&s.shift_left, &s.merge_left),
        Move::Right => (&s.shift_right, &s.merge_right),
        _ => unreachable!("shift_rows only handles left/right"),
    };
    let (res, score) = (0..4).fold((0, 0), |(new_board, score), row_idx| {
        let row_val = extract_line(board.0, row_idx) as usize;
        (new_board | (table[row_val] << (48 - (16 * row_idx))), score + merges[row_val])
    });
    (Board(res), score)
}

fn shift_cols(board: Board, move_dir: Move) -> (Board, u32) {
    let transpose_board = transpose(board.0);
    let s = stores();
    let (table, merges): (&[u64], &[u32]) = match move_dir {
        Move::Up => (&s.shift_up, &s.merge_left),
        Move::Down => (&s.shift_down, &s.merge_right),
        _ => unreachable!("shift_cols only handles up/down"),
    };
    let (res, score) = (0..4).fold((0, 0), |(new_board, score), col_idx| {
        let col_val = extract_line(transpose_board, col_idx) as usize;
        (new_board | (table[col_val] << (12 - (4 * col_idx))), score + merges[col_val])
    });
    (Board(res), score)
}

#[inline]
fn exponent_to_value(exp: u64) -> u32 {
    if exp == 0 { 0 } else { 1 << exp }
}

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> u32 { if rng.gen_range(0..10) < 9 { 2 } else { 4 } }

// https://stackoverflow.com/questions/38225571/count-number-of-zero-nibbles-in-an-unsigned-64-bit-integer
fn count_non_empty(board: Board) -> usize {
    let mut board_copy = board.0;
    board_copy |= board_copy >> 1;
    board_copy |= board_copy >> 2;
    board_copy &= 0x1111111111111111;
    board_copy.count_ones() as usize
}

fn format_val(val: u32) -> String {
    match val {
        0 => " ".repeat(7),
        x => format!("{:^7}", x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn board(grid: Grid) -> Board { Board::from_grid(grid).unwrap() }

    #[test]
    fn slide_line_basics() {
        assert_eq!(slide_line([0, 0, 0, 0]), ([0, 0, 0, 0], 0));
        assert_eq!(slide_line([2, 4, 2, 4]), ([2, 4, 2, 4], 0));
        assert_eq!(slide_line([2, 2, 4, 4]), ([4, 8, 0, 0], 12));
        assert_eq!(slide_line([2, 0, 0, 2]), ([4, 0, 0, 0], 4));
        assert_eq!(slide_line([0, 0, 0, 2]), ([2, 0, 0, 0], 0));
        assert_eq!(slide_line([4, 2, 2, 0]), ([4, 4, 0, 0], 4));
    }

    #[test]
    fn merged_tile_does_not_merge_again() {
        assert_eq!(slide_line([2, 2, 2, 2]), ([4, 4, 0, 0], 8));
        assert_eq!(slide_line([4, 4, 8, 0]), ([8, 8, 0, 0], 8));
        assert_eq!(slide_line([2, 2, 2, 0]), ([4, 2, 0, 0], 4));
    }

    #[test]
    fn slide_never_adds_tiles() {
        for raw in 0..LINE_TABLE_SIZE as u64 {
            let values: [u32; 4] = std::array::from_fn(|i| exponent_to_value((raw >> ((3 - i) * 4)) & 0xf));
            let (out, _) = slide_line(values);
            let before = values.iter().filter(|&&v| v != 0).count();
            let after = out.iter().filter(|&&v| v != 0).count();
            assert!(after <= before);
        }
    }

    #[test]
    fn test_shift_left() {
        new();
        assert_eq!(Board::from_raw(0x0000).shift(Move::Left), Board::from_raw(0x0000));
        assert_eq!(Board::from_raw(0x0002).shift(Move::Left), Board::from_raw(0x2000));
        assert_eq!(Board::from_raw(0x2020).shift(Move::Left), Board::from_raw(0x3000));
        assert_eq!(Board::from_raw(0x1332).shift(Move::Left), Board::from_raw(0x1420));
        assert_eq!(Board::from_raw(0x1234).shift(Move::Left), Board::from_raw(0x1234));
        assert_eq!(Board::from_raw(0x1002).shift(Move::Left), Board::from_raw(0x1200));
        assert_ne!(Board::from_raw(0x1210).shift(Move::Left), Board::from_raw(0x2200));
    }

    #[test]
    fn test_shift_right() {
        assert_eq!(Board::from_raw(0x2000).shift(Move::Right), Board::from_raw(0x0002));
        assert_eq!(Board::from_raw(0x2020).shift(Move::Right), Board::from_raw(0x0003));
        assert_eq!(Board::from_raw(0x1332).shift(Move::Right), Board::from_raw(0x0142));
        assert_eq!(Board::from_raw(0x1002).shift(Move::Right), Board::from_raw(0x0012));
        // 2,2,2 slides right as reverse-apply-reverse: the rightmost pair merges.
        assert_eq!(Board::from_raw(0x0111).shift(Move::Right), Board::from_raw(0x0012));
    }

    #[test]
    fn test_move_left() {
        let game = Board::from_raw(0x1234133220021002);
        assert_eq!(game.shift(Move::Left), Board::from_raw(0x1234142030001200));
    }

    #[test]
    fn test_move_up() {
        let game = Board::from_raw(0x1121230033004222);
        assert_eq!(game.shift(Move::Up), Board::from_raw(0x1131240232004000));
    }

    #[test]
    fn test_move_right() {
        let game = Board::from_raw(0x1234133220021002);
        assert_eq!(game.shift(Move::Right), Board::from_raw(0x1234014200030012));
    }

    #[test]
    fn test_move_down() {
        let game = Board::from_raw(0x1121230033004222);
        assert_eq!(game.shift(Move::Down), Board::from_raw(0x1000210034014232));
    }

    #[test]
    fn corners_slide_left() {
        let b = board([[2, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 2]]);
        let out = b.apply(Move::Left);
        assert!(out.moved);
        assert_eq!(out.score, 0);
        assert_eq!(out.board.to_grid(), [[2, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [2, 0, 0, 0]]);
    }

    #[test]
    fn score_is_sum_of_merged_tiles() {
        let b = board([[2, 2, 4, 4], [0; 4], [0; 4], [0; 4]]);
        let out = b.apply(Move::Left);
        assert_eq!(out.board.to_grid()[0], [4, 8, 0, 0]);
        assert_eq!(out.score, 12);

        let b = board([[2, 0, 0, 0], [2, 0, 0, 0], [8, 0, 0, 0], [8, 0, 0, 0]]);
        let out = b.apply(Move::Down);
        assert_eq!(out.board.to_grid(), [[0; 4], [0; 4], [4, 0, 0, 0], [16, 0, 0, 0]]);
        assert_eq!(out.score, 20);
    }

    #[test]
    fn unmoved_board_is_returned_unchanged() {
        let b = board([[2, 4, 8, 16], [0; 4], [0; 4], [0; 4]]);
        let out = b.apply(Move::Up);
        assert!(!out.moved);
        assert_eq!(out.board, b);
        assert_eq!(out.score, 0);
        assert!(!b.apply(Move::Left).moved);
        assert!(b.apply(Move::Down).moved);
    }

    #[test]
    fn largest_tiles_do_not_merge() {
        let b = board([[MAX_TILE, MAX_TILE, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert!(!b.apply(Move::Left).moved);
        assert!(b.apply(Move::Right).moved);
        assert_eq!(b.apply(Move::Right).score, 0);
    }

    #[test]
    fn terminal_matches_available_moves() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
            for step in 0..400 {
                assert_eq!(b.is_terminal(), b.available_moves().is_empty(), "board {b:?}");
                let moves = b.available_moves();
                if moves.is_empty() {
                    break;
                }
                b = b.apply(moves[step % moves.len()]).board.with_random_tile(&mut rng);
            }
        }
    }

    #[test]
    fn terminal_requires_full_board() {
        let b = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 0]]);
        assert!(!b.is_terminal());
        let b = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 4]]);
        assert!(!b.is_terminal());
    }

    #[test]
    fn adjacent_largest_tiles_are_terminal() {
        let b = board([[MAX_TILE, MAX_TILE, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(b.available_moves().is_empty());
        assert!(b.is_terminal());
        let b = board([[MAX_TILE, 2, 4, 2], [MAX_TILE, 4, 2, 4], [2, 2, 4, 2], [4, 8, 2, 4]]);
        assert_eq!(b.is_terminal(), b.available_moves().is_empty());
        assert!(!b.is_terminal());
    }

    #[test]
    fn empty_cells_row_major() {
        let b = board([[2, 0, 2, 2], [2, 2, 2, 2], [2, 2, 0, 2], [2, 2, 2, 2]]);
        assert_eq!(b.empty_cells(), vec![Cell::new(0, 1), Cell::new(2, 2)]);
        assert_eq!(b.count_empty(), 2);
    }

    #[test]
    fn with_tile_places_value() {
        let b = Board::EMPTY.with_tile(Cell::new(1, 2), 4).with_tile(Cell::new(3, 3), 2048);
        assert_eq!(b.get(1, 2), 4);
        assert_eq!(b.get(3, 3), 2048);
        assert_eq!(b.highest_tile(), 2048);
        assert_eq!(b.with_tile(Cell::new(1, 2), 2).get(1, 2), 2);
    }

    #[test]
    fn random_tiles_fill_the_board() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut b = Board::EMPTY;
        for _ in 0..16 {
            b = b.with_random_tile(&mut rng);
        }
        assert_eq!(b.count_empty(), 0);
        assert!(b.to_grid().iter().flatten().all(|&v| v == 2 || v == 4));
        assert_eq!(b.with_random_tile(&mut rng), b);
    }

    #[test]
    fn grid_round_trip_and_errors() {
        let grid = [[0, 2, 4, 8], [16, 32, 64, 128], [256, 512, 1024, 2048], [4096, 8192, 16384, 32768]];
        assert_eq!(board(grid).to_grid(), grid);
        assert_eq!(
            Board::from_grid([[0, 0, 0, 0], [0, 6, 0, 0], [0; 4], [0; 4]]),
            Err(BoardError::NotPowerOfTwo { row: 1, col: 1, value: 6 })
        );
        assert_eq!(
            Board::from_grid([[1, 0, 0, 0], [0; 4], [0; 4], [0; 4]]),
            Err(BoardError::NotPowerOfTwo { row: 0, col: 0, value: 1 })
        );
        assert!(matches!(
            Board::from_grid([[65536, 0, 0, 0], [0; 4], [0; 4], [0; 4]]),
            Err(BoardError::TooLarge { .. })
        ));
    }

    #[test]
    fn it_count_empty() {
        let game = Board::from_raw(0x1111000011110000);
        assert_eq!(game.count_empty(), 8);
        let game = Board::from_raw(0x1100000000000000);
        assert_eq!(game.count_empty(), 14);
        assert_eq!(Board::EMPTY.highest_tile(), 0);
    }

    #[test]
    fn it_get_tile_val() {
        let game = Board::from_raw(0x0123456789abcdef);
        assert_eq!(game.get(0, 3), 8);
        assert_eq!(game.get(2, 2), 1024);
        assert_eq!(game.get(3, 3), 32768);
    }
}
