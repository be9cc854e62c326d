//! Action timer seam.
//!
//! The game owns exactly one [`ActionTimer`]. Every reschedule goes through
//! [`ActionTimer::schedule`], which replaces any pending expiry, so at most
//! one expiry is ever pending per game. Expiry delivery is the implementor's
//! job: it must end up calling `Game::on_action_timer_expiry` on the thread
//! that owns the game.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub trait ActionTimer {
    /// Schedule an expiry after `delay`, cancelling any pending one first.
    fn schedule(&mut self, delay: Duration);

    /// Cancel the pending expiry. Safe to call when nothing is scheduled.
    fn cancel(&mut self);

    fn is_scheduled(&self) -> bool;
}

#[derive(Debug, Default)]
struct ManualTimerState {
    pending: Option<Duration>,
    schedules: u32,
    cancels: u32,
}

/// Timer that never fires on its own.
///
/// Used headless and in tests: the caller inspects the pending delay and
/// drives expiries by hand. Clones share state, so a clone kept outside the
/// game observes what the game scheduled.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    state: Rc<RefCell<ManualTimerState>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay of the pending expiry, if any
    pub fn pending(&self) -> Option<Duration> {
        self.state.borrow().pending
    }

    /// Total number of schedule calls
    pub fn schedule_count(&self) -> u32 {
        self.state.borrow().schedules
    }

    /// Number of cancels that actually removed a pending expiry
    pub fn cancel_count(&self) -> u32 {
        self.state.borrow().cancels
    }

    /// Consume the pending expiry. Returns false if nothing was scheduled.
    pub fn take_expiry(&self) -> bool {
        self.state.borrow_mut().pending.take().is_some()
    }
}

impl ActionTimer for ManualTimer {
    fn schedule(&mut self, delay: Duration) {
        self.cancel();
        let mut state = self.state.borrow_mut();
        state.pending = Some(delay);
        state.schedules += 1;
    }

    fn cancel(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.pending.take().is_some() {
            state.cancels += 1;
        }
    }

    fn is_scheduled(&self) -> bool {
        self.state.borrow().pending.is_some()
    }
}
