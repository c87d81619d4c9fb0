//! Deferred actions keyed to simulated time.

use crate::config::EngineConfig;
use crate::tags::TagId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimerId(pub u64);

/// Work performed when a timer comes due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferredAction {
    RemoveTag(TagId),
}

#[derive(Clone, Debug)]
struct Timer {
    id: TimerId,
    remaining: f32,
    action: DeferredAction,
    cancelled: bool,
}

/// Countdown timers advanced by the owner's step.
///
/// Cancelling only flags the timer; the flag is checked when it comes due, so
/// a cancelled timer never runs its action.
#[derive(Clone, Debug, Default)]
pub struct DeferredTimers {
    timers: Vec<Timer>,
    next_id: u64,
}

impl DeferredTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay: f32, action: DeferredAction) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            remaining: delay,
            action,
            cancelled: false,
        });
        id
    }

    /// Returns `true` if a live timer was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.timers.iter_mut().find(|t| t.id == id && !t.cancelled) {
            Some(timer) => {
                timer.cancelled = true;
                true
            }
            None => false,
        }
    }

    /// Seconds until a live timer fires.
    pub fn remaining(&self, id: TimerId) -> Option<f32> {
        self.timers
            .iter()
            .find(|t| t.id == id && !t.cancelled)
            .map(|t| t.remaining.max(0.0))
    }

    pub fn pending(&self) -> usize {
        self.timers.iter().filter(|t| !t.cancelled).count()
    }

    /// Advances every timer by `dt` and returns the due, uncancelled actions in
    /// scheduling order.
    pub fn advance(&mut self, dt: f32) -> Vec<DeferredAction> {
        let mut due = Vec::new();
        self.timers.retain_mut(|timer| {
            timer.remaining -= dt;
            if timer.remaining > EngineConfig::TIME_EPSILON {
                return true;
            }
            if !timer.cancelled {
                due.push(timer.action);
            }
            false
        });
        due
    }
}
