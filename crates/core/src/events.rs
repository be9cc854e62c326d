//! Engine events for presentation.
//!
//! Listeners are fire-and-forget: every method has a no-op default, so a
//! listener only overrides what it renders.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;

use crate::pieces::Piece;
use crate::types::{Coordinate, SoundEvent};

pub trait GameListener {
    /// The current piece changed (drawn, rotated or swapped)
    fn on_next_piece(&mut self, _piece: &Piece) {}

    /// The following (lookahead) piece changed
    fn on_following_piece(&mut self, _piece: &Piece) {}

    /// One clearing pass removed these cells
    fn on_lines_cleared(&mut self, _cells: &BTreeSet<Coordinate>) {}

    /// A fresh action timer was scheduled with this delay
    fn on_timer_restarted(&mut self, _delay: Duration) {}

    /// Lives dropped below zero. Fired once per game.
    fn on_game_over(&mut self) {}

    /// A placement at (x, y) was rejected
    fn on_placement_rejected(&mut self, _x: i8, _y: i8) {}

    /// Audio cue to play
    fn on_sound(&mut self, _sound: SoundEvent) {}
}

/// Flattened event record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    NextPiece(Piece),
    FollowingPiece(Piece),
    LinesCleared(BTreeSet<Coordinate>),
    TimerRestarted(Duration),
    GameOver,
    PlacementRejected { x: i8, y: i8 },
    Sound(SoundEvent),
}

/// Listener that records every event into a shared log.
///
/// Keep a clone to read the log while the game owns the other one.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<GameEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: GameEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl GameListener for EventRecorder {
    fn on_next_piece(&mut self, piece: &Piece) {
        self.push(GameEvent::NextPiece(*piece));
    }

    fn on_following_piece(&mut self, piece: &Piece) {
        self.push(GameEvent::FollowingPiece(*piece));
    }

    fn on_lines_cleared(&mut self, cells: &BTreeSet<Coordinate>) {
        self.push(GameEvent::LinesCleared(cells.clone()));
    }

    fn on_timer_restarted(&mut self, delay: Duration) {
        self.push(GameEvent::TimerRestarted(delay));
    }

    fn on_game_over(&mut self) {
        self.push(GameEvent::GameOver);
    }

    fn on_placement_rejected(&mut self, x: i8, y: i8) {
        self.push(GameEvent::PlacementRejected { x, y });
    }

    fn on_sound(&mut self, sound: SoundEvent) {
        self.push(GameEvent::Sound(sound));
    }
}
