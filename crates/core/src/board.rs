//! Board module - manages the play field
//!
//! The board is a 5x5 grid where each cell is empty (0) or holds the color
//! index (1-15) of the piece that filled it.
//! Uses a flat array for cache locality and zero-allocation scans.
//! Coordinates: (x, y) where x is the column 0..4 (left to right) and y the
//! row 0..4 (top to bottom).
//!
//! Out-of-bounds reads return `None` instead of failing, so placement checks
//! can probe the whole 3x3 piece box near the edges and treat the border as
//! a wall.

use std::fmt;

use arrayvec::ArrayVec;

use crate::pieces::Piece;
use crate::types::{Cell, Coordinate, BOARD_HEIGHT, BOARD_WIDTH, PIECE_COUNT};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// Cells removed by a single row or column clear
pub type ClearedCells = ArrayVec<Coordinate, 5>;

/// Rows and columns that are completely filled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FullLines {
    pub rows: ArrayVec<u8, 5>,
    pub cols: ArrayVec<u8, 5>,
}

impl FullLines {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.cols.is_empty()
    }

    pub fn line_count(&self) -> u32 {
        (self.rows.len() + self.cols.len()) as u32
    }
}

struct CellWatcher {
    /// `None` watches every cell
    index: Option<usize>,
    callback: Box<dyn FnMut(Coordinate, Cell)>,
}

/// The play field - 5 columns x 5 rows using flat array storage
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
    watchers: Vec<CellWatcher>,
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [0; BOARD_SIZE],
            watchers: Vec::new(),
        }
    }

    /// Create a board from a row-major grid (`grid[y][x]`)
    pub fn from_grid(grid: [[Cell; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize]) -> Self {
        let mut board = Self::new();
        for (y, row) in grid.iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                debug_assert!(cell <= PIECE_COUNT);
                board.cells[y * BOARD_WIDTH as usize + x] = cell;
            }
        }
        board
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y).
    /// Returns None if out of bounds.
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Unconditional write of a cell.
    /// Returns false if out of bounds.
    pub fn set(&mut self, x: i8, y: i8, value: Cell) -> bool {
        debug_assert!(value <= PIECE_COUNT, "cell value {} out of range", value);
        let Some(idx) = Self::index(x, y) else {
            return false;
        };
        if self.cells[idx] != value {
            self.cells[idx] = value;
            self.notify(idx);
        }
        true
    }

    fn notify(&mut self, idx: usize) {
        let coord = Coordinate::new(
            (idx % BOARD_WIDTH as usize) as u8,
            (idx / BOARD_WIDTH as usize) as u8,
        );
        let value = self.cells[idx];
        for watcher in &mut self.watchers {
            if watcher.index.map_or(true, |i| i == idx) {
                (watcher.callback)(coord, value);
            }
        }
    }

    /// Watch a single cell. The callback runs whenever its value changes.
    /// Returns false if (x, y) is out of bounds.
    pub fn observe(&mut self, x: i8, y: i8, callback: impl FnMut(Coordinate, Cell) + 'static) -> bool {
        let Some(idx) = Self::index(x, y) else {
            return false;
        };
        self.watchers.push(CellWatcher {
            index: Some(idx),
            callback: Box::new(callback),
        });
        true
    }

    /// Watch every cell.
    pub fn observe_all(&mut self, callback: impl FnMut(Coordinate, Cell) + 'static) {
        self.watchers.push(CellWatcher {
            index: None,
            callback: Box::new(callback),
        });
    }

    /// Check if position is within bounds and empty
    pub fn is_valid(&self, x: i8, y: i8) -> bool {
        self.get(x, y) == Some(0)
    }

    /// Check if position is within bounds and filled
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(v) if v != 0)
    }

    /// Check whether `piece` fits with its center cell at (x, y).
    ///
    /// Every occupied block must land on an in-bounds empty cell.
    pub fn can_place(&self, piece: &Piece, x: i8, y: i8) -> bool {
        piece
            .offsets()
            .iter()
            .all(|&(dx, dy)| self.is_valid(x - 1 + dx, y - 1 + dy))
    }

    /// Place `piece` with its center cell at (x, y).
    /// Returns false, leaving the board untouched, if it does not fit.
    pub fn place(&mut self, piece: &Piece, x: i8, y: i8) -> bool {
        if !self.can_place(piece, x, y) {
            return false;
        }

        let color = piece.color();
        for (dx, dy) in piece.offsets() {
            self.set(x - 1 + dx, y - 1 + dy, color);
        }

        true
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: u8) -> bool {
        if y >= BOARD_HEIGHT {
            return false;
        }
        let start = y as usize * BOARD_WIDTH as usize;
        let end = start + BOARD_WIDTH as usize;
        self.cells[start..end].iter().all(|&cell| cell != 0)
    }

    /// Check if a column is completely filled
    pub fn is_col_full(&self, x: u8) -> bool {
        if x >= BOARD_WIDTH {
            return false;
        }
        (0..BOARD_HEIGHT as usize).all(|y| self.cells[y * BOARD_WIDTH as usize + x as usize] != 0)
    }

    /// Find every full row and column. Rows and columns are judged
    /// independently, so an intersection cell counts toward both.
    pub fn find_full_lines(&self) -> FullLines {
        let mut lines = FullLines::default();
        for y in 0..BOARD_HEIGHT {
            if self.is_row_full(y) {
                lines.rows.push(y);
            }
        }
        for x in 0..BOARD_WIDTH {
            if self.is_col_full(x) {
                lines.cols.push(x);
            }
        }
        lines
    }

    /// Empty row `y` and report every coordinate in it
    pub fn clear_row(&mut self, y: u8) -> ClearedCells {
        let mut cleared = ArrayVec::new();
        if y >= BOARD_HEIGHT {
            return cleared;
        }
        for x in 0..BOARD_WIDTH {
            self.set(x as i8, y as i8, 0);
            cleared.push(Coordinate::new(x, y));
        }
        cleared
    }

    /// Empty column `x` and report every coordinate in it
    pub fn clear_col(&mut self, x: u8) -> ClearedCells {
        let mut cleared = ArrayVec::new();
        if x >= BOARD_WIDTH {
            return cleared;
        }
        for y in 0..BOARD_HEIGHT {
            self.set(x as i8, y as i8, 0);
            cleared.push(Coordinate::new(x, y));
        }
        cleared
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Copy the board into a row-major grid (`grid[y][x]`)
    pub fn grid(&self) -> [[Cell; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize] {
        let mut out = [[0; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        for (y, row) in out.iter_mut().enumerate() {
            let start = y * BOARD_WIDTH as usize;
            row.copy_from_slice(&self.cells[start..start + BOARD_WIDTH as usize]);
        }
        out
    }

    /// Number of non-empty cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        for idx in 0..BOARD_SIZE {
            if self.cells[idx] != 0 {
                self.cells[idx] = 0;
                self.notify(idx);
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("cells", &self.grid())
            .field("watchers", &self.watchers.len())
            .finish()
    }
}
