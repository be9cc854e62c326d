//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains all the game rules, state management, and the piece
//! synchronization seam used by multiplayer matches.
//! It has **zero dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed (or same delivered queue) produces identical games
//! - **Testable**: Timers and piece sources are injected, so tests drive them by hand
//! - **Portable**: Presentation binds through listeners and observable values
//!
//! # Module Structure
//!
//! - [`board`]: 5x5 play field with placement checks and row/column clearing
//! - [`pieces`]: The 15-shape catalog and exact 3x3 rotation
//! - [`game_state`]: The engine: score, level, lives, multiplier, aim, timer
//! - [`scoring`]: Clear scoring, level thresholds, timer delay formula
//! - [`source`]: Random and network-queued piece sources
//! - [`timer`]: Single-slot action timer seam
//! - [`observable`]: Bindable scalar values
//! - [`events`]: Listener trait for presentation
//!
//! # Game Rules
//!
//! - **Placement**: The current piece is stamped anywhere it fits, centered on the chosen cell
//! - **Clearing**: Full rows and full columns clear together after each placement
//! - **Multiplier**: Grows with consecutive clearing placements, resets otherwise
//! - **Action timer**: Failing to place in time costs a life and the current piece
//! - **Game over**: When lives drop below zero
//!
//! # Example
//!
//! ```
//! use tetrecs_core::{Game, Placement};
//!
//! let mut game = Game::solo(12345);
//! game.start().unwrap();
//!
//! // Every catalog piece fits on an empty board at the center
//! let placement = game.attempt_placement(2, 2).unwrap();
//! assert!(placement.is_placed());
//! assert_eq!(game.lives(), 3);
//! ```
//!
//! # Timing
//!
//! The action timer delay is `max(12000 - 500 * level, 2500)` ms. Call
//! [`Game::on_action_timer_expiry`](game_state::Game::on_action_timer_expiry)
//! on the game's own thread when it fires.

pub mod board;
pub mod events;
pub mod game_state;
pub mod observable;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod source;
pub mod timer;

pub use tetrecs_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, FullLines};
pub use events::{EventRecorder, GameEvent, GameListener};
pub use game_state::{Game, GameConfig, GameError, GamePhase, Placement};
pub use observable::Observable;
pub use pieces::{get_shape, rotate_blocks, Piece};
pub use rng::SimpleRng;
pub use scoring::{calculate_score, timer_delay, timer_delay_ms, ScoringRule};
pub use snapshot::{GameSnapshot, GameSummary};
pub use source::{PieceQueue, PieceSource, QueuedPieceSource, RandomPieceSource, SourceError};
pub use timer::{ActionTimer, ManualTimer};
