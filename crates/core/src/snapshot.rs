use crate::game_state::GamePhase;
use crate::pieces::Piece;
use crate::types::{Cell, Coordinate, BOARD_HEIGHT, BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub board: [[Cell; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    pub current: Option<Piece>,
    pub following: Option<Piece>,
    pub score: u32,
    pub level: u32,
    pub lives: i32,
    pub multiplier: u32,
    pub aim: Coordinate,
    pub phase: GamePhase,
    pub timer_delay_ms: u32,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        self.phase == GamePhase::Running
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: [[0; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            current: None,
            following: None,
            score: 0,
            level: 0,
            lives: 0,
            multiplier: 1,
            aim: Coordinate::default(),
            phase: GamePhase::Idle,
            timer_delay_ms: 0,
        }
    }
}

/// End-of-game record handed to score keeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameSummary {
    pub score: u32,
    pub level: u32,
    pub lives: i32,
    pub pieces_placed: u32,
    pub lines_cleared: u32,
}
