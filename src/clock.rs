//! Timer primitives for the drop clock and the frame task.

use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// The only timing primitive the engine needs. Firing is reported back to
/// the engine by the host through the handle.
pub trait Clock {
    fn schedule_after(&mut self, delay: Duration) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

/// Timers keyed on elapsed time since the queue was created. The owner moves
/// time forward explicitly, so tests drive it by hand and the terminal
/// frontend drives it from a monotonic clock.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    pending: Vec<(Duration, TimerHandle)>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|(_, h)| *h == handle)
    }

    pub fn deadline(&self, handle: TimerHandle) -> Option<Duration> {
        self.pending
            .iter()
            .find(|(_, h)| *h == handle)
            .map(|(due, _)| *due)
    }

    /// Earliest deadline still outstanding.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|(due, _)| *due).min()
    }

    /// Moves time forward to `now` (never backwards) and pops the earliest
    /// expired timer, if any. Call repeatedly until it returns `None`.
    pub fn poll_expired(&mut self, now: Duration) -> Option<TimerHandle> {
        self.now = self.now.max(now);
        let (index, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (due, _))| *due <= self.now)
            .min_by_key(|(_, (due, handle))| (*due, *handle))?;
        Some(self.pending.remove(index).1)
    }

    /// Pops the earliest pending timer regardless of its deadline, jumping
    /// time forward to it.
    pub fn fire_next(&mut self) -> Option<TimerHandle> {
        let due = self.next_deadline()?;
        self.poll_expired(due)
    }
}

impl Clock for TimerQueue {
    fn schedule_after(&mut self, delay: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending.push((self.now + delay, handle));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|(_, h)| *h != handle);
    }
}
