//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, input mapping, multiplayer protocol).
//!
//! # Board Dimensions
//!
//! The play field is a fixed 5x5 grid and every piece fits a 3x3 bounding box:
//!
//! - **Width**: 5 columns (indexed 0-4)
//! - **Height**: 5 rows (indexed 0-4)
//! - **Piece box**: 3x3, origin at its center cell
//!
//! # Game Timing Constants
//!
//! The action timer penalizes inaction. Its delay shrinks with level:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BASE_TIMER_MS` | 12000 | Delay at level 0 |
//! | `TIMER_STEP_MS` | 500 | Reduction per level |
//! | `TIMER_FLOOR_MS` | 2500 | Minimum delay (reached at level 19) |
//!
//! # Examples
//!
//! ```
//! use tetrecs_types::{PieceKind, Rotation, GameAction, BOARD_WIDTH, BOARD_HEIGHT};
//!
//! // Catalog lookup
//! let piece = PieceKind::from_index(2).unwrap();
//! assert_eq!(piece, PieceKind::Plus);
//! assert_eq!(piece.color(), 3);
//!
//! // Rotate
//! let rotation = Rotation::North;
//! assert_eq!(rotation.rotate_cw(), Rotation::East);
//! assert_eq!(rotation.rotate_by(3), Rotation::West);
//!
//! // Parse game action
//! let action = GameAction::from_str("rotateCw").unwrap();
//! assert_eq!(action, GameAction::RotateCw);
//!
//! // Board dimensions
//! assert_eq!(BOARD_WIDTH, 5);
//! assert_eq!(BOARD_HEIGHT, 5);
//! ```

/// Board width in cells (5 columns)
pub const BOARD_WIDTH: u8 = 5;

/// Board height in cells (5 rows)
pub const BOARD_HEIGHT: u8 = 5;

/// Side length of a piece's occupancy box
pub const PIECE_SIZE: usize = 3;

/// Number of shapes in the piece catalog
pub const PIECE_COUNT: u8 = 15;

/// Lives at the start of a game
pub const STARTING_LIVES: i32 = 3;

/// Action timer delay at level 0
pub const BASE_TIMER_MS: u32 = 12_000;

/// Action timer reduction per level
pub const TIMER_STEP_MS: u32 = 500;

/// Action timer never drops below this
pub const TIMER_FLOOR_MS: u32 = 2_500;

/// Score needed per level (`(level + 1) * LEVEL_SCORE_STEP` to advance)
pub const LEVEL_SCORE_STEP: u32 = 1_000;

/// Points per line per block, before the multiplier
pub const POINTS_PER_BLOCK: u32 = 10;


/// The fifteen piece shapes, in catalog order
///
/// The catalog index is the wire representation used by the multiplayer
/// protocol, and `index + 1` is the color written into board cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Line,
    C,
    Plus,
    Dot,
    Square,
    L,
    J,
    S,
    Z,
    T,
    X,
    Corner,
    InverseCorner,
    Diagonal,
    Double,
}

impl PieceKind {
    /// Every kind, indexed by catalog position
    pub const ALL: [PieceKind; PIECE_COUNT as usize] = [
        PieceKind::Line,
        PieceKind::C,
        PieceKind::Plus,
        PieceKind::Dot,
        PieceKind::Square,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::T,
        PieceKind::X,
        PieceKind::Corner,
        PieceKind::InverseCorner,
        PieceKind::Diagonal,
        PieceKind::Double,
    ];

    /// Look up a kind by catalog index (0-14)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrecs_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_index(0), Some(PieceKind::Line));
    /// assert_eq!(PieceKind::from_index(14), Some(PieceKind::Double));
    /// assert_eq!(PieceKind::from_index(15), None);
    /// ```
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Catalog index (0-14)
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Color written into board cells (1-15)
    pub fn color(&self) -> u8 {
        self.index() + 1
    }

    /// Parse piece kind from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        Self::ALL.iter().copied().find(|k| k.as_str() == lower)
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::Line => "line",
            PieceKind::C => "c",
            PieceKind::Plus => "plus",
            PieceKind::Dot => "dot",
            PieceKind::Square => "square",
            PieceKind::L => "l",
            PieceKind::J => "j",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::T => "t",
            PieceKind::X => "x",
            PieceKind::Corner => "corner",
            PieceKind::InverseCorner => "inversecorner",
            PieceKind::Diagonal => "diagonal",
            PieceKind::Double => "double",
        }
    }
}

/// Rotation states of a piece's occupancy
///
/// - **North**: Catalog orientation (0°)
/// - **East**: Rotated 90° clockwise
/// - **South**: Rotated 180°
/// - **West**: Rotated 270° clockwise (90° anti-clockwise)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrecs_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        self.rotate_by(1)
    }

    /// Rotate anti-clockwise, i.e. three clockwise turns
    pub fn rotate_ccw(&self) -> Self {
        self.rotate_by(3)
    }

    /// Apply `times` clockwise quarter turns (mod 4)
    pub fn rotate_by(&self, times: u32) -> Self {
        Self::from_turns(self.turns() as u32 + times % 4)
    }

    /// Rotation reached after `turns` clockwise quarter turns from North
    pub fn from_turns(turns: u32) -> Self {
        match turns % 4 {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }

    /// Clockwise quarter turns from North (0-3)
    pub fn turns(&self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }
}

/// A board cell position. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Coordinate {
    pub x: u8,
    pub y: u8,
}

impl Coordinate {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

/// Game actions driven by keyboard or network input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move the aim cursor one cell left
    AimLeft,
    /// Move the aim cursor one cell right
    AimRight,
    /// Move the aim cursor one cell up
    AimUp,
    /// Move the aim cursor one cell down
    AimDown,
    /// Place the current piece centered on the aim cursor
    Place,
    /// Rotate the current piece 90° clockwise
    RotateCw,
    /// Rotate the current piece 90° anti-clockwise
    RotateCcw,
    /// Swap the current and following piece
    Swap,
    /// Leave the match
    Leave,
}

impl GameAction {
    /// Parse action from string
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrecs_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("aimLeft"), Some(GameAction::AimLeft));
    /// assert_eq!(GameAction::from_str("swap"), Some(GameAction::Swap));
    /// assert_eq!(GameAction::from_str("hardDrop"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "aimleft" => Some(GameAction::AimLeft),
            "aimright" => Some(GameAction::AimRight),
            "aimup" => Some(GameAction::AimUp),
            "aimdown" => Some(GameAction::AimDown),
            "place" => Some(GameAction::Place),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "swap" => Some(GameAction::Swap),
            "leave" => Some(GameAction::Leave),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::AimLeft => "aimLeft",
            GameAction::AimRight => "aimRight",
            GameAction::AimUp => "aimUp",
            GameAction::AimDown => "aimDown",
            GameAction::Place => "place",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Swap => "swap",
            GameAction::Leave => "leave",
        }
    }
}

/// Named audio cues emitted next to state changes.
///
/// Playback is an external concern; the engine only names the cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEvent {
    Place,
    Fail,
    Clear,
    LevelUp,
    Rotate,
    LifeLost,
}

impl SoundEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEvent::Place => "place",
            SoundEvent::Fail => "fail",
            SoundEvent::Clear => "clear",
            SoundEvent::LevelUp => "level",
            SoundEvent::Rotate => "rotate",
            SoundEvent::LifeLost => "explode",
        }
    }
}

/// Result of one clear-and-score pass that removed at least one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearEvent {
    pub lines_cleared: u32,
    pub blocks_cleared: u32,
    pub score_delta: u32,
    /// Multiplier the delta was computed with (before it was incremented)
    pub multiplier: u32,
}

/// A cell on the game board
///
/// - `0`: Empty cell
/// - `1..=15`: Occupied, rendered in the color of catalog entry `value - 1`
pub type Cell = u8;
