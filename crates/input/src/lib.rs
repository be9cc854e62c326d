//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`]. Nothing
//! here touches a game; the caller feeds the actions to a session.

pub mod map;

pub use tetrecs_types as types;

pub use map::{handle_key_event, read_action, should_quit};
