//! Scoring module - line-clear score, level thresholds and timer delay
//!
//! Score for a clearing pass is `lines * blocks * 10 * multiplier`, with the
//! multiplier read before it is incremented for that pass.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::types::{
    Coordinate, BASE_TIMER_MS, BOARD_HEIGHT, BOARD_WIDTH, LEVEL_SCORE_STEP, POINTS_PER_BLOCK,
    TIMER_FLOOR_MS, TIMER_STEP_MS,
};

/// How blocks are counted when rows and columns clear together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringRule {
    /// `lines * 5`, minus one when both rows and columns clear.
    ///
    /// Exact only when at most one row and one column overlap; kept so that
    /// scores match other clients of the same match.
    #[default]
    Classic,
    /// Number of distinct cells actually removed.
    DistinctCells,
}

/// Count of blocks credited for a clearing pass
pub fn blocks_cleared(
    rule: ScoringRule,
    rows: usize,
    cols: usize,
    cleared: &BTreeSet<Coordinate>,
) -> u32 {
    match rule {
        ScoringRule::Classic => {
            let lines = (rows + cols) as u32;
            // rows and columns share the side length on a square board
            let per_line = BOARD_WIDTH.max(BOARD_HEIGHT) as u32;
            if rows > 0 && cols > 0 {
                lines * per_line - 1
            } else {
                lines * per_line
            }
        }
        ScoringRule::DistinctCells => cleared.len() as u32,
    }
}

/// Score delta for a clearing pass
pub fn calculate_score(lines: u32, blocks: u32, multiplier: u32) -> u32 {
    lines
        .saturating_mul(blocks)
        .saturating_mul(POINTS_PER_BLOCK)
        .saturating_mul(multiplier)
}

/// Score at which `level` advances to `level + 1`
pub fn level_threshold(level: u32) -> u32 {
    level.saturating_add(1).saturating_mul(LEVEL_SCORE_STEP)
}

/// Action timer delay in milliseconds: `max(12000 - 500 * level, 2500)`
pub fn timer_delay_ms(level: u32) -> u32 {
    BASE_TIMER_MS
        .saturating_sub(TIMER_STEP_MS.saturating_mul(level))
        .max(TIMER_FLOOR_MS)
}

/// Action timer delay for `level`
pub fn timer_delay(level: u32) -> Duration {
    Duration::from_millis(timer_delay_ms(level) as u64)
}
