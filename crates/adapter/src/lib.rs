//! Adapter module - multiplayer networking and the session runtime
//!
//! This module connects a [`Game`](tetrecs_core::Game) to a TetrECS-style
//! multiplayer server over a line-oriented TCP protocol, and drives the
//! action timer on tokio for both solo and multiplayer play.
//!
//! # Protocol Overview
//!
//! Every message is one text line, `VERB [payload]`:
//!
//! 1. **Connection**: The client connects to the server (default: 127.0.0.1:9700)
//! 2. **Prefetch**: The client sends `PIECE` a few times and waits for two pieces
//! 3. **Play**: Each piece drawn sends one more `PIECE` request
//! 4. **Mirroring**: Score and lives changes go out as `SCORE`/`LIVES`, the board as `BOARD`
//! 5. **Leaving**: The client sends `DIE`
//!
//! See [`protocol`] for the full verb tables.
//!
//! # Threading
//!
//! The game is single-threaded. Timer expiries and server messages are
//! queued as [`LoopEvent`]s and handled by [`Session::pump`] on the thread
//! that owns the session.
//!
//! # Environment Variables
//!
//! - `TETRECS_HOST`: Server address (default: "127.0.0.1")
//! - `TETRECS_PORT`: Port number (default: 9700)
//! - `TETRECS_PREFETCH`: Pieces requested before the match starts (default: 3, minimum 2)
//! - `TETRECS_WIRE_LOG`: Append every wire line to this file as JSON
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: PIECE
//! Client -> Server: PIECE
//! Client -> Server: PIECE
//! Server -> Client: PIECE 4
//! Server -> Client: PIECE 11
//! Server -> Client: PIECE 0
//! Client -> Server: PIECE
//! Client -> Server: BOARD 0 0 0 0 0 0 5 5 0 0 ...
//! Client -> Server: SCORE 50
//! Client -> Server: SCORES
//! Server -> Client: SCORES alice:50:3|bob:0:2
//! ```

pub mod channel;
pub mod protocol;
pub mod runtime;
pub mod timer;

pub use tetrecs_core as core;
pub use tetrecs_types as types;

pub use channel::{run_channel, ChannelConfig};
pub use protocol::*;
pub use runtime::{LoopEvent, Session};
pub use timer::{TimerGate, TokioActionTimer};
