//! Tokio-backed action timer.
//!
//! Expiry is delivered as a [`LoopEvent::TimerExpired`] message, never by
//! calling into the game from a runtime thread. Each schedule gets a fresh
//! generation; an expiry whose generation is no longer current was
//! overtaken by a cancel or reschedule and must be dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::ActionTimer;
use crate::runtime::LoopEvent;

pub struct TokioActionTimer {
    handle: Handle,
    events: mpsc::UnboundedSender<LoopEvent>,
    task: Option<JoinHandle<()>>,
    generation: Arc<AtomicU64>,
}

/// Read side of the timer generation, kept by the session loop
#[derive(Debug, Clone)]
pub struct TimerGate {
    generation: Arc<AtomicU64>,
}

impl TimerGate {
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

impl TokioActionTimer {
    pub fn new(handle: Handle, events: mpsc::UnboundedSender<LoopEvent>) -> Self {
        Self {
            handle,
            events,
            task: None,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn gate(&self) -> TimerGate {
        TimerGate {
            generation: Arc::clone(&self.generation),
        }
    }
}

impl ActionTimer for TokioActionTimer {
    fn schedule(&mut self, delay: Duration) {
        self.cancel();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let events = self.events.clone();
        self.task = Some(self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(LoopEvent::TimerExpired { generation });
        }));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn is_scheduled(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TokioActionTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
