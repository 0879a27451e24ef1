//! Single-threaded, virtual-time timer scheduler.
//!
//! Timers are either one-shot or periodic and belong to an owner (the
//! lifecycle phase that armed them). The driver moves time forward and pops
//! due timers one at a time, so handlers may cancel or arm timers between
//! firings.

use std::time::Duration;

/// Handle returned when arming a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A timer that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<E> {
    pub id: TimerId,
    pub at: Duration,
    pub event: E,
}

#[derive(Debug, Clone)]
struct Timer<E, O> {
    id: TimerId,
    owner: O,
    due: Duration,
    period: Option<Duration>,
    event: E,
}

#[derive(Debug, Clone)]
pub struct TimerScheduler<E, O> {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer<E, O>>,
}

impl<E, O> Default for TimerScheduler<E, O> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            timers: Vec::new(),
        }
    }
}

impl<E: Clone, O: Copy + PartialEq> TimerScheduler<E, O> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time since the scheduler was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `event` once, `delay` from now.
    pub fn schedule_once(&mut self, owner: O, delay: Duration, event: E) -> TimerId {
        self.arm(owner, delay, None, event)
    }

    /// Fire `event` every `period`, first after one period.
    ///
    /// A zero period is bumped to one millisecond so time always moves forward.
    pub fn schedule_every(&mut self, owner: O, period: Duration, event: E) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.arm(owner, period, Some(period), event)
    }

    fn arm(&mut self, owner: O, delay: Duration, period: Option<Duration>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            owner,
            due: self.now.saturating_add(delay),
            period,
            event,
        });
        id
    }

    /// Returns true if the timer was still armed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Cancel every timer armed by `owner`; returns how many were dropped.
    pub fn cancel_owned_by(&mut self, owner: O) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.owner != owner);
        before - self.timers.len()
    }

    #[must_use]
    pub fn is_armed(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Earliest deadline among armed timers.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Pop the earliest timer due at or before `deadline`, moving time to its due point.
    ///
    /// Ties fire in arming order. Periodic timers are re-armed one period later.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<Fired<E>> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= deadline)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(index, _)| index)?;

        let due = self.timers[index].due;
        self.now = self.now.max(due);

        let fired = match self.timers[index].period {
            Some(period) => {
                let timer = &mut self.timers[index];
                timer.due = due.saturating_add(period);
                Fired {
                    id: timer.id,
                    at: due,
                    event: timer.event.clone(),
                }
            }
            None => {
                let timer = self.timers.remove(index);
                Fired {
                    id: timer.id,
                    at: due,
                    event: timer.event,
                }
            }
        };
        Some(fired)
    }

    /// Move time to `deadline` without firing anything.
    ///
    /// Call after draining `pop_due(deadline)`.
    pub fn settle(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}
