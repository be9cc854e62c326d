//! TetrECS (workspace facade crate).
//!
//! This package exposes `tetrecs::{core,adapter,input,types}` while the
//! implementation lives in dedicated crates under `crates/`.

pub use tetrecs_adapter as adapter;
pub use tetrecs_core as core;
pub use tetrecs_input as input;
pub use tetrecs_types as types;
