//! Pieces module - the 15-shape catalog and its rotation algebra
//!
//! Every shape is a 3x3 occupancy grid stored row-major (`blocks[y][x]`).
//! The center cell `(1, 1)` is the piece origin used for placement.
//! Rotation is exact: a clockwise quarter turn transposes the grid and then
//! reverses each row, so four turns always restore the original occupancy.

use arrayvec::ArrayVec;

use crate::types::{PieceKind, Rotation, PIECE_SIZE};

/// 3x3 occupancy grid, `blocks[y][x]`
pub type Blocks = [[bool; PIECE_SIZE]; PIECE_SIZE];

/// Offset of an occupied cell from the top-left of the piece box
pub type BlockOffset = (i8, i8);

const O: bool = false;
const X: bool = true;

/// Get the catalog occupancy for a piece kind (North orientation)
pub fn get_shape(kind: PieceKind) -> Blocks {
    match kind {
        PieceKind::Line => [[O, X, O], [O, X, O], [O, X, O]],
        PieceKind::C => [[O, X, X], [O, X, O], [O, X, X]],
        PieceKind::Plus => [[O, X, O], [X, X, X], [O, X, O]],
        PieceKind::Dot => [[O, O, O], [O, X, O], [O, O, O]],
        PieceKind::Square => [[X, X, O], [X, X, O], [O, O, O]],
        PieceKind::L => [[O, X, O], [O, X, O], [O, X, X]],
        PieceKind::J => [[O, X, O], [O, X, O], [X, X, O]],
        PieceKind::S => [[O, O, X], [O, X, X], [O, X, O]],
        PieceKind::Z => [[X, O, O], [X, X, O], [O, X, O]],
        PieceKind::T => [[X, X, X], [O, X, O], [O, O, O]],
        PieceKind::X => [[X, O, X], [O, X, O], [X, O, X]],
        PieceKind::Corner => [[O, X, X], [O, X, O], [O, O, O]],
        PieceKind::InverseCorner => [[X, X, O], [O, X, O], [O, O, O]],
        PieceKind::Diagonal => [[X, O, O], [O, X, O], [O, O, X]],
        PieceKind::Double => [[O, O, O], [X, X, O], [O, O, O]],
    }
}

/// Rotate an occupancy grid clockwise `times` quarter turns (mod 4)
pub fn rotate_blocks(blocks: &Blocks, times: u32) -> Blocks {
    let mut out = *blocks;
    for _ in 0..times % 4 {
        let mut turned = [[false; PIECE_SIZE]; PIECE_SIZE];
        for (y, row) in turned.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                // transpose, then reverse the row
                *cell = out[PIECE_SIZE - 1 - x][y];
            }
        }
        out = turned;
    }
    out
}

/// A catalog piece together with its current orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    rotation: Rotation,
    blocks: Blocks,
}

impl Piece {
    /// Create a piece in catalog orientation
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            blocks: get_shape(kind),
        }
    }

    /// Create a piece from its catalog index (0-14)
    pub fn from_index(index: u8) -> Option<Self> {
        PieceKind::from_index(index).map(Self::new)
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    /// Color index written into board cells
    pub fn color(&self) -> u8 {
        self.kind.color()
    }

    /// Pure rotation: a new piece turned clockwise `times` quarter turns
    pub fn rotated(&self, times: u32) -> Self {
        Self {
            kind: self.kind,
            rotation: self.rotation.rotate_by(times),
            blocks: rotate_blocks(&self.blocks, times),
        }
    }

    /// Rotate in place clockwise `times` quarter turns
    pub fn rotate(&mut self, times: u32) {
        *self = self.rotated(times);
    }

    /// Occupied cells as offsets from the top-left of the piece box
    pub fn offsets(&self) -> ArrayVec<BlockOffset, 9> {
        let mut out = ArrayVec::new();
        for (y, row) in self.blocks.iter().enumerate() {
            for (x, &filled) in row.iter().enumerate() {
                if filled {
                    out.push((x as i8, y as i8));
                }
            }
        }
        out
    }

    /// Number of occupied cells
    pub fn block_count(&self) -> usize {
        self.blocks.iter().flatten().filter(|&&b| b).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shape_is_non_empty() {
        for kind in PieceKind::ALL {
            assert!(Piece::new(kind).block_count() > 0, "{:?} is empty", kind);
        }
    }

    #[test]
    fn test_clockwise_turn_of_t() {
        let t = Piece::new(PieceKind::T).rotated(1);
        assert_eq!(t.blocks(), &[[O, O, X], [O, X, X], [O, O, X]]);
        assert_eq!(t.rotation(), Rotation::East);
    }

    #[test]
    fn test_three_turns_equal_one_anticlockwise() {
        let c = Piece::new(PieceKind::C);
        let anti = c.rotated(3);
        // one clockwise turn of the anti-clockwise result is the original
        assert_eq!(anti.rotated(1).blocks(), c.blocks());
    }

    #[test]
    fn test_offsets_match_blocks() {
        let p = Piece::new(PieceKind::Double);
        assert_eq!(p.offsets().as_slice(), &[(0, 1), (1, 1)]);
    }
}
