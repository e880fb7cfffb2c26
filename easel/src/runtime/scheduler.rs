use std::time::Instant;

/// Opaque identity of an armed timer. Stale handles are harmless: cancelling
/// a timer that already fired or was already cancelled is a no-op.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimerHandle(u64);

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TimerStats {
    pub armed: u64,
    pub cancelled: u64,
    pub fired: u64,
}

impl TimerStats {
    pub fn live(&self) -> u64 {
        self.armed - self.cancelled - self.fired
    }
}

struct TimerEntry<T> {
    handle: TimerHandle,
    deadline: Instant,
    task: T,
}

/// Single-threaded timer queue backing both periodic runtime activities.
///
/// Timers are one-shot: a fired timer is consumed and must be re-armed by
/// its owner. Owners that want at most one live timer per activity cancel
/// their previous handle before arming a new one.
pub struct Scheduler<T> {
    next_id: u64,
    entries: Vec<TimerEntry<T>>,
    stats: TimerStats,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
            stats: TimerStats::default(),
        }
    }

    pub fn arm(&mut self, at: Instant, task: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.stats.armed += 1;
        self.entries.push(TimerEntry {
            handle,
            deadline: at,
            task,
        });
        handle
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let Some(index) =
            self.entries.iter().position(|entry| entry.handle == handle)
        else {
            return false;
        };

        self.entries.swap_remove(index);
        self.stats.cancelled += 1;
        true
    }

    /// Removes and returns the earliest timer whose deadline has passed.
    /// Ties break by armament order so dispatch stays deterministic.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerHandle, T)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.deadline <= now)
            .min_by_key(|(_, entry)| (entry.deadline, entry.handle))
            .map(|(index, _)| index)?;

        let entry = self.entries.swap_remove(index);
        self.stats.fired += 1;
        Some((entry.handle, entry.task))
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|entry| entry.deadline).min()
    }

    pub fn live_count(&self) -> usize {
        self.entries.len()
    }

    pub fn stats(&self) -> TimerStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn pops_in_deadline_order() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.arm(start + Duration::from_millis(20), "b");
        scheduler.arm(start + Duration::from_millis(10), "a");

        let far = start + Duration::from_millis(30);
        assert_eq!(scheduler.pop_due(far).map(|(_, t)| t), Some("a"));
        assert_eq!(scheduler.pop_due(far).map(|(_, t)| t), Some("b"));
        assert_eq!(scheduler.pop_due(far), None);
    }

    #[test]
    fn pending_timers_are_not_due_early() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.arm(start + Duration::from_millis(10), "a");

        assert_eq!(scheduler.pop_due(start), None);
        assert_eq!(scheduler.live_count(), 1);
    }

    #[test]
    fn cancel_removes_only_the_named_timer() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let a = scheduler.arm(start + Duration::from_millis(10), "a");
        scheduler.arm(start + Duration::from_millis(10), "b");

        assert!(scheduler.cancel(a));
        assert!(!scheduler.cancel(a));

        let far = start + Duration::from_millis(30);
        assert_eq!(scheduler.pop_due(far).map(|(_, t)| t), Some("b"));
    }

    #[test]
    fn ties_break_by_armament_order() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let at = start + Duration::from_millis(5);
        scheduler.arm(at, "first");
        scheduler.arm(at, "second");

        assert_eq!(scheduler.pop_due(at).map(|(_, t)| t), Some("first"));
        assert_eq!(scheduler.pop_due(at).map(|(_, t)| t), Some("second"));
    }

    #[test]
    fn stats_balance_against_live_count() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let a = scheduler.arm(start, "a");
        scheduler.arm(start, "b");
        scheduler.cancel(a);
        scheduler.pop_due(start);

        let stats = scheduler.stats();
        assert_eq!(stats.armed, 2);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.fired, 1);
        assert_eq!(stats.live() as usize, scheduler.live_count());
    }
}
