//! Piece sources - where the engine's next piece comes from.
//!
//! Solo games use [`RandomPieceSource`]. Multiplayer games use
//! [`QueuedPieceSource`], which signals the network for each draw and pops
//! the head of a [`PieceQueue`] filled by network deliveries, so every
//! participant sees the same sequence in the same order.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::pieces::Piece;
use crate::rng::SimpleRng;
use crate::types::{PieceKind, PIECE_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceError {
    /// A draw found the multiplayer queue empty. The network layer must keep
    /// deliveries ahead of consumption.
    QueueEmpty,
    /// A delivered piece index is outside the catalog.
    InvalidIndex(u32),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::QueueEmpty => write!(f, "piece queue is empty"),
            SourceError::InvalidIndex(i) => {
                write!(f, "piece index {} outside catalog 0..{}", i, PIECE_COUNT)
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// Supplies the engine with new pieces.
pub trait PieceSource {
    fn next_piece(&mut self) -> Result<Piece, SourceError>;
}

/// Uniform random draws from the catalog
#[derive(Debug, Clone)]
pub struct RandomPieceSource {
    rng: SimpleRng,
}

impl RandomPieceSource {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: SimpleRng::from_entropy(),
        }
    }

    pub fn seed(&self) -> u32 {
        self.rng.seed()
    }
}

impl PieceSource for RandomPieceSource {
    fn next_piece(&mut self) -> Result<Piece, SourceError> {
        Ok(Piece::new(self.rng.next_kind()))
    }
}

/// FIFO of network-delivered pieces.
///
/// Cloning yields another handle to the same queue: the network side keeps
/// one to call [`PieceQueue::add_piece`], the engine's source keeps another.
#[derive(Debug, Clone, Default)]
pub struct PieceQueue {
    inner: Arc<Mutex<VecDeque<PieceKind>>>,
}

impl PieceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<PieceKind>> {
        // a poisoned queue still holds valid indices
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a delivered piece by catalog index.
    pub fn add_piece(&self, index: u32) -> Result<(), SourceError> {
        let kind = u8::try_from(index)
            .ok()
            .and_then(PieceKind::from_index)
            .ok_or(SourceError::InvalidIndex(index))?;
        self.lock().push_back(kind);
        Ok(())
    }

    pub fn pop(&self) -> Option<PieceKind> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Pending pieces, head first
    pub fn pending(&self) -> Vec<PieceKind> {
        self.lock().iter().copied().collect()
    }
}

/// Network-fed source: every draw requests one more piece, then pops the head.
pub struct QueuedPieceSource {
    queue: PieceQueue,
    request: Box<dyn FnMut()>,
}

impl QueuedPieceSource {
    /// `request` is invoked once per draw to ask the network for a replacement.
    pub fn new(queue: PieceQueue, request: impl FnMut() + 'static) -> Self {
        Self {
            queue,
            request: Box::new(request),
        }
    }

    pub fn queue(&self) -> &PieceQueue {
        &self.queue
    }
}

impl PieceSource for QueuedPieceSource {
    fn next_piece(&mut self) -> Result<Piece, SourceError> {
        (self.request)();
        self.queue
            .pop()
            .map(Piece::new)
            .ok_or(SourceError::QueueEmpty)
    }
}

impl fmt::Debug for QueuedPieceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedPieceSource")
            .field("queue", &self.queue)
            .finish()
    }
}
