//! Game state module - the game engine
//!
//! This module ties together all core components: board, pieces, piece
//! source, scoring and the action timer. It handles placement, line clears,
//! the score/level/lives/multiplier state machine and game lifecycle.
//!
//! The engine does no locking. All calls, including
//! [`Game::on_action_timer_expiry`], must come from the one thread that owns
//! the game.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use crate::board::Board;
use crate::events::GameListener;
use crate::observable::Observable;
use crate::pieces::Piece;
use crate::scoring::{blocks_cleared, calculate_score, level_threshold, timer_delay, ScoringRule};
use crate::snapshot::{GameSnapshot, GameSummary};
use crate::source::{PieceSource, RandomPieceSource, SourceError};
use crate::timer::{ActionTimer, ManualTimer};
use crate::types::*;

/// Lifecycle of one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    /// Created, not started
    #[default]
    Idle,
    Running,
    /// Lives dropped below zero. Terminal.
    GameOver,
    /// The player left before the game ended
    Stopped,
}

/// Game configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub starting_lives: i32,
    pub scoring: ScoringRule,
    /// Seed for locally generated pieces; `None` seeds from the clock
    pub seed: Option<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_lives: STARTING_LIVES,
            scoring: ScoringRule::Classic,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// The operation needs a running game
    NotRunning(GamePhase),
    /// The piece source could not produce a piece
    Source(SourceError),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::NotRunning(phase) => write!(f, "game is not running (phase {:?})", phase),
            GameError::Source(e) => write!(f, "cannot draw next piece: {}", e),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Source(e) => Some(e),
            GameError::NotRunning(_) => None,
        }
    }
}

impl From<SourceError> for GameError {
    fn from(e: SourceError) -> Self {
        GameError::Source(e)
    }
}

/// Outcome of a placement attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Blocked or out of bounds; nothing changed
    Rejected,
    Placed {
        clear: Option<ClearEvent>,
        level_up: bool,
    },
}

impl Placement {
    pub fn is_placed(&self) -> bool {
        matches!(self, Placement::Placed { .. })
    }
}

/// Complete game state
pub struct Game {
    board: Board,
    score: Observable<u32>,
    level: Observable<u32>,
    lives: Observable<i32>,
    multiplier: Observable<u32>,
    aim: Observable<Coordinate>,
    current: Option<Piece>,
    following: Option<Piece>,
    source: Box<dyn PieceSource>,
    timer: Box<dyn ActionTimer>,
    listeners: Vec<Box<dyn GameListener>>,
    config: GameConfig,
    phase: GamePhase,
    /// Last clearing pass (consumed by observers).
    last_clear: Option<ClearEvent>,
    pieces_placed: u32,
    lines_cleared: u32,
}

impl Game {
    pub fn new(source: impl PieceSource + 'static, timer: impl ActionTimer + 'static) -> Self {
        Self::with_config(source, timer, GameConfig::default())
    }

    pub fn with_config(
        source: impl PieceSource + 'static,
        timer: impl ActionTimer + 'static,
        config: GameConfig,
    ) -> Self {
        Self {
            board: Board::new(),
            score: Observable::new(0),
            level: Observable::new(0),
            lives: Observable::new(config.starting_lives),
            multiplier: Observable::new(1),
            aim: Observable::new(Coordinate::default()),
            current: None,
            following: None,
            source: Box::new(source),
            timer: Box::new(timer),
            listeners: Vec::new(),
            config,
            phase: GamePhase::Idle,
            last_clear: None,
            pieces_placed: 0,
            lines_cleared: 0,
        }
    }

    /// Seeded single-player game driven by a [`ManualTimer`]
    pub fn solo(seed: u32) -> Self {
        Self::new(RandomPieceSource::new(seed), ManualTimer::new())
    }

    pub fn add_listener(&mut self, listener: impl GameListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn on_score_change(&mut self, f: impl FnMut(u32) + 'static) {
        self.score.subscribe(f);
    }

    pub fn on_level_change(&mut self, f: impl FnMut(u32) + 'static) {
        self.level.subscribe(f);
    }

    pub fn on_lives_change(&mut self, f: impl FnMut(i32) + 'static) {
        self.lives.subscribe(f);
    }

    pub fn on_multiplier_change(&mut self, f: impl FnMut(u32) + 'static) {
        self.multiplier.subscribe(f);
    }

    pub fn on_aim_change(&mut self, f: impl FnMut(Coordinate) + 'static) {
        self.aim.subscribe(f);
    }

    /// Watch one board cell for presentation binding
    pub fn observe_cell(&mut self, x: i8, y: i8, f: impl FnMut(Coordinate, Cell) + 'static) -> bool {
        self.board.observe(x, y, f)
    }

    /// Watch every board cell
    pub fn observe_board(&mut self, f: impl FnMut(Coordinate, Cell) + 'static) {
        self.board.observe_all(f)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score.get()
    }

    pub fn level(&self) -> u32 {
        self.level.get()
    }

    pub fn lives(&self) -> i32 {
        self.lives.get()
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier.get()
    }

    pub fn aim(&self) -> Coordinate {
        self.aim.get()
    }

    pub fn current_piece(&self) -> Option<Piece> {
        self.current
    }

    pub fn following_piece(&self) -> Option<Piece> {
        self.following
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn last_clear(&self) -> Option<ClearEvent> {
        self.last_clear
    }

    /// Delay of the action timer at the current level.
    ///
    /// Presentation animates its countdown against this same value.
    pub fn timer_delay(&self) -> Duration {
        timer_delay(self.level.get())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.grid(),
            current: self.current,
            following: self.following,
            score: self.score.get(),
            level: self.level.get(),
            lives: self.lives.get(),
            multiplier: self.multiplier.get(),
            aim: self.aim.get(),
            phase: self.phase,
            timer_delay_ms: self.timer_delay().as_millis() as u32,
        }
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            score: self.score.get(),
            level: self.level.get(),
            lives: self.lives.get(),
            pieces_placed: self.pieces_placed,
            lines_cleared: self.lines_cleared,
        }
    }

    fn emit(&mut self, mut f: impl FnMut(&mut dyn GameListener)) {
        for listener in &mut self.listeners {
            f(listener.as_mut());
        }
    }

    fn emit_pieces(&mut self) {
        if let Some(piece) = self.current {
            self.emit(|l| l.on_next_piece(&piece));
        }
        if let Some(piece) = self.following {
            self.emit(|l| l.on_following_piece(&piece));
        }
    }

    fn ensure_running(&self) -> Result<(), GameError> {
        if self.phase == GamePhase::Running {
            Ok(())
        } else {
            Err(GameError::NotRunning(self.phase))
        }
    }

    fn draw(&mut self) -> Result<Piece, GameError> {
        Ok(self.source.next_piece()?)
    }

    fn draw_pair(&mut self) -> Result<(Piece, Piece), GameError> {
        Ok((self.draw()?, self.draw()?))
    }

    /// Cancel the live timer and schedule a fresh one at the current delay
    fn restart_timer(&mut self) {
        let delay = self.timer_delay();
        self.timer.cancel();
        self.timer.schedule(delay);
        self.emit(|l| l.on_timer_restarted(delay));
    }

    /// Current takes the following piece; a new following piece is drawn.
    /// On a failed draw both pieces stay as they were.
    fn advance_piece(&mut self) -> Result<(), GameError> {
        let next = self.draw()?;
        self.current = self.following.take();
        self.following = Some(next);
        self.emit_pieces();
        Ok(())
    }

    /// Start (or restart) the game
    pub fn start(&mut self) -> Result<(), GameError> {
        self.timer.cancel();
        self.board.clear();
        self.score.set(0);
        self.level.set(0);
        self.lives.set(self.config.starting_lives);
        self.multiplier.set(1);
        self.aim.set(Coordinate::default());
        self.current = None;
        self.following = None;
        self.last_clear = None;
        self.pieces_placed = 0;
        self.lines_cleared = 0;
        self.phase = GamePhase::Running;

        self.restart_timer();

        let (current, following) = match self.draw_pair() {
            Ok(pair) => pair,
            Err(e) => {
                self.timer.cancel();
                self.phase = GamePhase::Idle;
                return Err(e);
            }
        };
        self.current = Some(current);
        self.following = Some(following);
        self.emit_pieces();

        Ok(())
    }

    /// Try to place the current piece with its center at (x, y)
    pub fn attempt_placement(&mut self, x: i8, y: i8) -> Result<Placement, GameError> {
        self.ensure_running()?;
        let Some(piece) = self.current else {
            return Err(GameError::NotRunning(self.phase));
        };

        if !self.board.place(&piece, x, y) {
            self.emit(|l| l.on_sound(SoundEvent::Fail));
            self.emit(|l| l.on_placement_rejected(x, y));
            return Ok(Placement::Rejected);
        }

        self.pieces_placed += 1;
        self.emit(|l| l.on_sound(SoundEvent::Place));

        self.restart_timer();
        let drawn = self.advance_piece();

        // the piece is committed, so its lines clear even if the draw failed
        let clear = self.clear_and_score();
        let level_up = self.level_check();
        drawn?;

        Ok(Placement::Placed { clear, level_up })
    }

    /// Place the current piece centered on the aim cursor
    pub fn place_at_aim(&mut self) -> Result<Placement, GameError> {
        let aim = self.aim.get();
        self.attempt_placement(aim.x as i8, aim.y as i8)
    }

    /// Clear every full row and column and score the pass
    fn clear_and_score(&mut self) -> Option<ClearEvent> {
        let lines = self.board.find_full_lines();
        if lines.is_empty() {
            self.multiplier.set(1);
            return None;
        }

        let mut cleared = BTreeSet::new();
        for &y in &lines.rows {
            cleared.extend(self.board.clear_row(y));
        }
        for &x in &lines.cols {
            cleared.extend(self.board.clear_col(x));
        }

        let lines_cleared = lines.line_count();
        let blocks = blocks_cleared(self.config.scoring, lines.rows.len(), lines.cols.len(), &cleared);
        let multiplier = self.multiplier.get();
        let score_delta = calculate_score(lines_cleared, blocks, multiplier);

        self.emit(|l| l.on_lines_cleared(&cleared));
        self.emit(|l| l.on_sound(SoundEvent::Clear));

        self.score.set(self.score.get().saturating_add(score_delta));
        self.multiplier.set(multiplier + 1);
        self.lines_cleared += lines_cleared;

        let event = ClearEvent {
            lines_cleared,
            blocks_cleared: blocks,
            score_delta,
            multiplier,
        };
        self.last_clear = Some(event);
        Some(event)
    }

    /// Advance at most one level per check
    fn level_check(&mut self) -> bool {
        let level = self.level.get();
        if self.score.get() < level_threshold(level) {
            return false;
        }
        self.level.set(level + 1);
        self.emit(|l| l.on_sound(SoundEvent::LevelUp));
        true
    }

    /// Rotate the current piece a quarter turn
    pub fn rotate_current_piece(&mut self, clockwise: bool) -> Result<(), GameError> {
        self.ensure_running()?;
        let Some(piece) = self.current.as_mut() else {
            return Ok(());
        };
        piece.rotate(if clockwise { 1 } else { 3 });
        let piece = *piece;

        self.emit(|l| l.on_sound(SoundEvent::Rotate));
        self.emit(|l| l.on_next_piece(&piece));
        Ok(())
    }

    /// Exchange the current and following piece. The action timer keeps running.
    pub fn swap_current_and_following(&mut self) -> Result<(), GameError> {
        self.ensure_running()?;
        std::mem::swap(&mut self.current, &mut self.following);
        self.emit(|l| l.on_sound(SoundEvent::Rotate));
        self.emit_pieces();
        Ok(())
    }

    /// Move the aim cursor. Each axis only moves if it stays on the board.
    pub fn move_aim(&mut self, dx: i8, dy: i8) -> Coordinate {
        let aim = self.aim.get();
        if self.phase != GamePhase::Running {
            return aim;
        }

        let step = |v: u8, d: i8, limit: u8| -> u8 {
            let next = v as i16 + d as i16;
            if next >= 0 && next < limit as i16 {
                next as u8
            } else {
                v
            }
        };
        let next = Coordinate::new(step(aim.x, dx, BOARD_WIDTH), step(aim.y, dy, BOARD_HEIGHT));
        self.aim.set(next);
        next
    }

    /// Dispatch a keyboard/network action
    pub fn apply_action(&mut self, action: GameAction) -> Result<(), GameError> {
        match action {
            GameAction::AimLeft => {
                self.move_aim(-1, 0);
            }
            GameAction::AimRight => {
                self.move_aim(1, 0);
            }
            GameAction::AimUp => {
                self.move_aim(0, -1);
            }
            GameAction::AimDown => {
                self.move_aim(0, 1);
            }
            GameAction::Place => {
                self.place_at_aim()?;
            }
            GameAction::RotateCw => self.rotate_current_piece(true)?,
            GameAction::RotateCcw => self.rotate_current_piece(false)?,
            GameAction::Swap => self.swap_current_and_following()?,
            GameAction::Leave => self.stop(),
        }
        Ok(())
    }

    /// The action timer ran out: the player loses a life and the piece they
    /// failed to place. Ignored unless the game is running.
    ///
    /// A replacement is drawn before lives are checked, so the expiry that
    /// ends the game still draws. A failed draw on that expiry is dropped. On
    /// any other expiry the timer is rescheduled before the draw error is
    /// returned.
    pub fn on_action_timer_expiry(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::Running {
            return Ok(());
        }

        self.emit(|l| l.on_sound(SoundEvent::LifeLost));
        self.lives.set(self.lives.get() - 1);
        self.multiplier.set(1);
        let drawn = self.advance_piece();

        if self.lives.get() < 0 {
            self.phase = GamePhase::GameOver;
            self.timer.cancel();
            self.emit(|l| l.on_game_over());
            return Ok(());
        }

        self.restart_timer();
        drawn
    }

    /// Leave the game: cancel the timer and stop accepting input.
    /// Safe to call in any phase.
    pub fn stop(&mut self) {
        self.timer.cancel();
        if self.phase == GamePhase::Running {
            self.phase = GamePhase::Stopped;
        }
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("board", &self.board)
            .field("score", &self.score.get())
            .field("level", &self.level.get())
            .field("lives", &self.lives.get())
            .field("multiplier", &self.multiplier.get())
            .field("aim", &self.aim.get())
            .field("current", &self.current)
            .field("following", &self.following)
            .field("phase", &self.phase)
            .finish()
    }
}
