//! Repeating timers driven by an explicit clock.
//!
//! Components never start OS timers themselves. They register a [`Task`] with a
//! [`Scheduler`] and keep the returned [`TimerHandle`]; the UI loop advances the
//! clock and dispatches whatever fired. Tests advance the same clock by hand.

use std::collections::BTreeMap;
use std::time::Duration;

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Fetch the health map.
    HealthPoll,
    /// Fetch inventory and health together.
    DashboardPoll,
    /// Advance the monitor-mode scroll position.
    AutoScroll,
}

/// Handle to a scheduled timer.
///
/// Not `Clone`: cancelling consumes the handle, so a timer is cancelled at most once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a timer that is never cancelled keeps firing"]
pub struct TimerHandle(u64);

/// Registers and cancels repeating timers.
pub trait Scheduler {
    /// Fire `task` every `every`, starting one period from now.
    fn schedule(&mut self, every: Duration, task: Task) -> TimerHandle;

    /// Stop a timer. Returns false if it was already gone.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

/// Cancel whatever timer is stored in `slot`, then schedule a new one into it.
pub fn restart(
    slot: &mut Option<TimerHandle>,
    scheduler: &mut dyn Scheduler,
    every: Duration,
    task: Task,
) {
    stop(slot, scheduler);
    *slot = Some(scheduler.schedule(every, task));
}

/// Cancel the timer stored in `slot`, if any.
pub fn stop(slot: &mut Option<TimerHandle>, scheduler: &mut dyn Scheduler) {
    if let Some(handle) = slot.take() {
        scheduler.cancel(handle);
    }
}

#[derive(Debug, Clone)]
struct Entry {
    every: Duration,
    next_due: Duration,
    task: Task,
}

/// Timer set on a virtual clock measured from an arbitrary origin.
#[derive(Debug, Default)]
pub struct Timers {
    now: Duration,
    next_id: u64,
    entries: BTreeMap<u64, Entry>,
}

/// Shortest accepted period; guards against a zero interval spinning forever.
const MIN_PERIOD: Duration = Duration::from_millis(1);

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move the clock forward to `now` and return the tasks that fired, in order.
    ///
    /// A timer that missed several periods fires once per period. Moving the
    /// clock backwards fires nothing.
    pub fn advance_to(&mut self, now: Duration) -> Vec<Task> {
        if now <= self.now {
            return Vec::new();
        }
        self.now = now;

        let mut fired: Vec<(Duration, u64, Task)> = Vec::new();
        for (id, entry) in self.entries.iter_mut() {
            while entry.next_due <= now {
                fired.push((entry.next_due, *id, entry.task));
                entry.next_due += entry.every;
            }
        }

        fired.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        fired.into_iter().map(|(_, _, task)| task).collect()
    }

    /// Move the clock forward by `by`.
    pub fn advance(&mut self, by: Duration) -> Vec<Task> {
        let target = self.now + by;
        self.advance_to(target)
    }

    /// Number of live timers.
    pub fn active(&self) -> usize {
        self.entries.len()
    }

    /// Number of live timers for `task`.
    pub fn active_for(&self, task: Task) -> usize {
        self.entries.values().filter(|e| e.task == task).count()
    }
}

impl Scheduler for Timers {
    fn schedule(&mut self, every: Duration, task: Task) -> TimerHandle {
        let every = every.max(MIN_PERIOD);
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(
            id,
            Entry {
                every,
                next_due: self.now + every,
                task,
            },
        );
        TimerHandle(id)
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.entries.remove(&handle.0).is_some()
    }
}
