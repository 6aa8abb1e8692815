//! Timer abstraction driving animation and inertia.
//!
//! The engine never sleeps or owns a thread. It arms repeating timers on a
//! [`Scheduler`] and the host forwards each fired [`TimerId`] back to
//! [`Viewer::on_timer`](crate::Viewer::on_timer).

use std::cell::RefCell;
use std::rc::Rc;

/// Identity of an armed timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Source of time and repeating timers.
///
/// No `Send` bounds; viewers are single-threaded and event driven.
pub trait Scheduler {
    /// Current time in milliseconds.
    fn now_ms(&self) -> f64;

    /// Arm a timer firing every `interval_ms` until cancelled.
    fn arm(&mut self, interval_ms: u32) -> TimerId;

    /// Cancel a timer. Unknown or already cancelled ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

#[derive(Debug, Default)]
struct ClockInner {
    now: u64,
    next_id: u64,
    timers: Vec<VirtualTimer>,
}

#[derive(Clone, Copy, Debug)]
struct VirtualTimer {
    id: TimerId,
    interval: u64,
    due: u64,
}

/// Deterministic scheduler with manually advanced time.
///
/// Clones share the same clock, so a host can keep a handle while the
/// viewer owns another.
///
/// ## Example
///
/// ```rust
/// use spinview_core::{Scheduler, VirtualClock};
///
/// let clock = VirtualClock::new();
/// let mut scheduler = clock.clone();
/// let id = scheduler.arm(40);
///
/// assert!(clock.advance(39).is_empty());
/// assert_eq!(clock.advance(81), vec![id, id, id]);
///
/// scheduler.cancel(id);
/// assert!(clock.advance(1000).is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct VirtualClock {
    inner: Rc<RefCell<ClockInner>>,
}

impl VirtualClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance time by `ms` and return the ids of all timers that fired, in
    /// firing order.
    pub fn advance(&self, ms: u64) -> Vec<TimerId> {
        let mut inner = self.inner.borrow_mut();
        let target = inner.now + ms;
        let mut fired = Vec::new();

        while let Some(index) = Self::next_due(&inner.timers, target) {
            let timer = &mut inner.timers[index];
            let due = timer.due;
            timer.due += timer.interval;
            fired.push(timer.id);
            inner.now = due;
        }
        inner.now = target;
        fired
    }

    /// Number of armed timers.
    pub fn armed(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    fn next_due(timers: &[VirtualTimer], target: u64) -> Option<usize> {
        timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(index, _)| index)
    }
}

impl Scheduler for VirtualClock {
    fn now_ms(&self) -> f64 {
        self.inner.borrow().now as f64
    }

    fn arm(&mut self, interval_ms: u32) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let id = TimerId(inner.next_id);
        inner.next_id += 1;
        let interval = u64::from(interval_ms.max(1));
        let due = inner.now + interval;
        inner.timers.push(VirtualTimer { id, interval, due });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.inner.borrow_mut().timers.retain(|t| t.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleaved_timers_fire_in_order() {
        let clock = VirtualClock::new();
        let mut scheduler = clock.clone();
        let slow = scheduler.arm(30);
        let fast = scheduler.arm(20);

        assert_eq!(clock.advance(60), vec![fast, slow, fast, slow, fast]);
        assert_eq!(scheduler.now_ms(), 60.0);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let clock = VirtualClock::new();
        let mut scheduler = clock.clone();
        let id = scheduler.arm(10);
        scheduler.cancel(id);
        scheduler.cancel(id);
        assert_eq!(clock.armed(), 0);
        assert!(clock.advance(100).is_empty());
    }

    #[test]
    fn test_zero_interval_is_bumped() {
        let clock = VirtualClock::new();
        let mut scheduler = clock.clone();
        let id = scheduler.arm(0);
        assert_eq!(clock.advance(3), vec![id, id, id]);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut clock = VirtualClock::new();
        let a = clock.arm(5);
        clock.cancel(a);
        let b = clock.arm(5);
        assert_ne!(a, b);
    }
}
