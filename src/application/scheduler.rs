use std::time::{Duration, Instant};

/// Token identifying one recurring schedule. Handles are unique per
/// schedule: once a schedule is cancelled or superseded, its handle is
/// stale and yields no further ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle(u64);

/// Cooperative, cancellable tick source. A scheduler carries at most one
/// active schedule; scheduling again supersedes the previous one. The
/// engine polls `due_ticks` from the host's frame loop instead of being
/// called back, which keeps tick execution serialized with every other
/// engine operation.
pub trait Scheduler {
    /// Start a recurring schedule at `interval`, replacing any active one
    fn schedule_recurring(&mut self, interval: Duration) -> TickHandle;

    /// Cancel the schedule behind `handle`. After this returns no tick is
    /// ever reported for it again. Cancelling a stale handle is a no-op.
    fn cancel(&mut self, handle: TickHandle);

    /// Consume and return the ticks currently due for `handle`.
    /// A stale or cancelled handle reports zero.
    fn due_ticks(&mut self, handle: TickHandle) -> u32;
}

struct ActiveSchedule {
    id: u64,
    interval: Duration,
    next_due: Instant,
}

/// Wall-clock scheduler for interactive hosts. Reports at most one tick
/// per poll; a backlog from a stalled frame is dropped and the deadline
/// resynced from the current instant.
#[derive(Default)]
pub struct IntervalScheduler {
    active: Option<ActiveSchedule>,
    next_id: u64,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule_recurring(&mut self, interval: Duration) -> TickHandle {
        self.next_id += 1;
        self.active = Some(ActiveSchedule {
            id: self.next_id,
            interval,
            next_due: Instant::now() + interval,
        });
        TickHandle(self.next_id)
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.active.as_ref().is_some_and(|a| a.id == handle.0) {
            self.active = None;
        }
    }

    fn due_ticks(&mut self, handle: TickHandle) -> u32 {
        let Some(active) = self.active.as_mut() else {
            return 0;
        };
        if active.id != handle.0 {
            return 0;
        }
        let now = Instant::now();
        if now < active.next_due {
            return 0;
        }
        active.next_due = now + active.interval;
        1
    }
}

/// Virtual-time scheduler for tests and headless hosts: time only moves
/// when `advance` is called, so tick delivery is fully synchronous.
#[derive(Default)]
pub struct ManualScheduler {
    active: Option<(u64, Duration)>,
    carry: Duration,
    pending: u32,
    next_id: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance virtual time. Every full interval elapsed queues one tick.
    /// A zero-length interval queues nothing.
    pub fn advance(&mut self, elapsed: Duration) {
        let Some((_, interval)) = self.active else {
            return;
        };
        if interval.is_zero() {
            return;
        }
        self.carry += elapsed;
        while self.carry >= interval {
            self.carry -= interval;
            self.pending += 1;
        }
    }

    /// Advance virtual time by `n` whole intervals
    pub fn advance_intervals(&mut self, n: u32) {
        if let Some((_, interval)) = self.active {
            self.advance(interval * n);
        }
    }

    /// Interval of the active schedule, if any
    pub fn interval(&self) -> Option<Duration> {
        self.active.map(|(_, interval)| interval)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_recurring(&mut self, interval: Duration) -> TickHandle {
        self.next_id += 1;
        self.active = Some((self.next_id, interval));
        self.carry = Duration::ZERO;
        self.pending = 0;
        TickHandle(self.next_id)
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.active.is_some_and(|(id, _)| id == handle.0) {
            self.active = None;
            self.carry = Duration::ZERO;
            self.pending = 0;
        }
    }

    fn due_ticks(&mut self, handle: TickHandle) -> u32 {
        match self.active {
            Some((id, _)) if id == handle.0 => std::mem::take(&mut self.pending),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_ticks_accumulate_per_interval() {
        let mut scheduler = ManualScheduler::new();
        let handle = scheduler.schedule_recurring(Duration::from_millis(100));

        scheduler.advance(Duration::from_millis(250));
        assert_eq!(scheduler.due_ticks(handle), 2);
        // The 50ms remainder carries over into the next interval
        scheduler.advance(Duration::from_millis(50));
        assert_eq!(scheduler.due_ticks(handle), 1);
    }

    #[test]
    fn test_manual_due_ticks_drains() {
        let mut scheduler = ManualScheduler::new();
        let handle = scheduler.schedule_recurring(Duration::from_millis(10));
        scheduler.advance_intervals(3);
        assert_eq!(scheduler.due_ticks(handle), 3);
        assert_eq!(scheduler.due_ticks(handle), 0);
    }

    #[test]
    fn test_cancelled_handle_reports_nothing() {
        let mut scheduler = ManualScheduler::new();
        let handle = scheduler.schedule_recurring(Duration::from_millis(10));
        scheduler.advance_intervals(2);
        scheduler.cancel(handle);
        assert_eq!(scheduler.due_ticks(handle), 0);
    }

    #[test]
    fn test_superseded_handle_is_stale() {
        let mut scheduler = ManualScheduler::new();
        let old = scheduler.schedule_recurring(Duration::from_millis(10));
        scheduler.advance_intervals(5);
        let new = scheduler.schedule_recurring(Duration::from_millis(20));

        // Rescheduling dropped the old schedule and its queued ticks
        assert_eq!(scheduler.due_ticks(old), 0);
        assert_eq!(scheduler.due_ticks(new), 0);

        scheduler.advance_intervals(1);
        assert_eq!(scheduler.due_ticks(old), 0);
        assert_eq!(scheduler.due_ticks(new), 1);
    }

    #[test]
    fn test_cancel_of_stale_handle_keeps_current_schedule() {
        let mut scheduler = ManualScheduler::new();
        let old = scheduler.schedule_recurring(Duration::from_millis(10));
        let new = scheduler.schedule_recurring(Duration::from_millis(10));

        scheduler.cancel(old);
        scheduler.advance_intervals(1);
        assert_eq!(scheduler.due_ticks(new), 1);
    }

    #[test]
    fn test_interval_scheduler_not_due_before_interval() {
        let mut scheduler = IntervalScheduler::new();
        let handle = scheduler.schedule_recurring(Duration::from_secs(3600));
        assert_eq!(scheduler.due_ticks(handle), 0);
    }

    #[test]
    fn test_interval_scheduler_fires_once_per_poll() {
        let mut scheduler = IntervalScheduler::new();
        let handle = scheduler.schedule_recurring(Duration::ZERO);
        assert_eq!(scheduler.due_ticks(handle), 1);
        assert_eq!(scheduler.due_ticks(handle), 1);

        scheduler.cancel(handle);
        assert_eq!(scheduler.due_ticks(handle), 0);
    }
}
