//! Virtual-time timer queue
//!
//! Engines never sleep or spawn threads. Delayed re-rounds, countdowns and the
//! physics loop are timers in a per-engine queue that the host pumps with the
//! elapsed frame time. Everything stays deterministic:
//! - Time only moves when `drive` is called
//! - Timers fire in due order, ties broken by arming order
//! - Each purpose owns one `TimerSlot`; re-arming a slot cancels its old timer

use std::time::Duration;

/// Opaque handle to an armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Storage for the one live timer of a given purpose
#[derive(Debug, Default)]
pub struct TimerSlot {
    id: Option<TimerId>,
}

impl TimerSlot {
    pub const fn new() -> Self {
        Self { id: None }
    }

    pub fn is_armed(&self) -> bool {
        self.id.is_some()
    }
}

#[derive(Debug)]
struct Timer<E> {
    id: TimerId,
    due: Duration,
    period: Option<Duration>,
    event: E,
}

/// Timer queue for one engine
#[derive(Debug)]
pub struct Scheduler<E> {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer<E>>,
}

impl<E: Clone> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            timers: Vec::new(),
        }
    }

    /// Virtual time elapsed since the scheduler was created
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Fire `event` once after `delay`, replacing whatever the slot held
    pub fn arm_once(&mut self, slot: &mut TimerSlot, delay: Duration, event: E) -> TimerId {
        self.arm(slot, delay, None, event)
    }

    /// Fire `event` every `period`, replacing whatever the slot held.
    /// A zero period is bumped to one millisecond so the queue always drains.
    pub fn arm_repeating(&mut self, slot: &mut TimerSlot, period: Duration, event: E) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.arm(slot, period, Some(period), event)
    }

    fn arm(
        &mut self,
        slot: &mut TimerSlot,
        delay: Duration,
        period: Option<Duration>,
        event: E,
    ) -> TimerId {
        self.cancel(slot);
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: self.now + delay,
            period,
            event,
        });
        slot.id = Some(id);
        id
    }

    /// Cancel the slot's timer, if any. Returns whether something was cancelled.
    pub fn cancel(&mut self, slot: &mut TimerSlot) -> bool {
        match slot.id.take() {
            Some(id) => {
                let before = self.timers.len();
                self.timers.retain(|t| t.id != id);
                before != self.timers.len()
            }
            None => false,
        }
    }

    /// Drop every timer (teardown)
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Whether the timer behind `slot` is still queued
    pub fn is_live(&self, slot: &TimerSlot) -> bool {
        slot.id
            .map(|id| self.timers.iter().any(|t| t.id == id))
            .unwrap_or(false)
    }

    /// Pop the earliest timer due at or before `deadline`.
    ///
    /// Virtual time jumps to the timer's due time. One-shot timers are removed;
    /// repeating timers are re-queued one period later.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<E> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= deadline)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;

        let due = self.timers[idx].due;
        self.now = self.now.max(due);
        match self.timers[idx].period {
            Some(period) => {
                let timer = &mut self.timers[idx];
                timer.due += period;
                Some(timer.event.clone())
            }
            None => Some(self.timers.swap_remove(idx).event),
        }
    }

    /// Move virtual time to `deadline` once nothing else is due
    pub fn settle(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}

/// An engine driven by a `Scheduler`
pub trait Timed {
    type Event: Clone;

    fn timers(&mut self) -> &mut Scheduler<Self::Event>;

    fn on_timer(&mut self, event: Self::Event);
}

/// Advance `game` by `elapsed`, delivering due events one at a time.
///
/// Each handler runs before the next timer is looked up, so a handler that
/// cancels a timer (game over, settings change) stops it within the same frame.
pub fn drive<G: Timed + ?Sized>(game: &mut G, elapsed: Duration) {
    let deadline = game.timers().now() + elapsed;
    while let Some(event) = game.timers().pop_due(deadline) {
        game.on_timer(event);
    }
    game.timers().settle(deadline);
}
