//! Cancellable timers on the session clock
//!
//! Timers hold a task value and fire in order of due time (ties by creation
//! order). The clock is whatever the caller passes in; the director passes
//! game time, which stops while paused.

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u32);

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    due_ms: u64,
    /// `Some` for repeating timers
    period_ms: Option<u64>,
    task: T,
}

/// Collection of pending repeating and single-shot timers
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    timers: Vec<Timer<T>>,
    next_id: u32,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T: Copy> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due_ms: u64, period_ms: Option<u64>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due_ms,
            period_ms,
            task,
        });
        id
    }

    /// Fire `task` every `period_ms`, first at `now_ms + period_ms`
    pub fn every(&mut self, now_ms: u64, period_ms: u64, task: T) -> TimerId {
        let period_ms = period_ms.max(1);
        self.push(now_ms.saturating_add(period_ms), Some(period_ms), task)
    }

    /// Fire `task` once at `now_ms + delay_ms`
    pub fn once(&mut self, now_ms: u64, delay_ms: u64, task: T) -> TimerId {
        self.push(now_ms.saturating_add(delay_ms), None, task)
    }

    /// Returns false if the timer already fired (single-shot) or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Cancel everything at once
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Take the earliest timer due at or before `until_ms`.
    ///
    /// Returns the time it was due and its task. Repeating timers are re-armed
    /// one period later; single-shot timers are removed.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(u64, T)> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let timer = &mut self.timers[index];
        let due_ms = timer.due_ms;
        let task = timer.task;
        match timer.period_ms {
            Some(period) => timer.due_ms = due_ms.saturating_add(period),
            None => {
                self.timers.swap_remove(index);
            }
        }
        Some((due_ms, task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Task {
        Spawn,
        Tick,
        Pop(u32),
    }

    fn drain(s: &mut Scheduler<Task>, until: u64) -> Vec<(u64, Task)> {
        std::iter::from_fn(|| s.pop_due(until)).collect()
    }

    #[test]
    fn test_repeating_fires_once_per_period() {
        let mut s = Scheduler::new();
        s.every(0, 500, Task::Spawn);
        let fired = drain(&mut s, 2000);
        assert_eq!(
            fired,
            vec![
                (500, Task::Spawn),
                (1000, Task::Spawn),
                (1500, Task::Spawn),
                (2000, Task::Spawn)
            ]
        );
        // Still armed for the next period
        assert_eq!(s.len(), 1);
        assert_eq!(s.pop_due(2499), None);
    }

    #[test]
    fn test_interleaves_by_due_time() {
        let mut s = Scheduler::new();
        s.every(0, 1000, Task::Tick);
        s.every(0, 700, Task::Spawn);
        s.once(0, 250, Task::Pop(9));
        let fired = drain(&mut s, 1400);
        assert_eq!(
            fired,
            vec![
                (250, Task::Pop(9)),
                (700, Task::Spawn),
                (1000, Task::Tick),
                (1400, Task::Spawn)
            ]
        );
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_ties_fire_in_creation_order() {
        let mut s = Scheduler::new();
        s.once(0, 100, Task::Pop(1));
        s.once(0, 100, Task::Pop(2));
        assert_eq!(s.pop_due(100), Some((100, Task::Pop(1))));
        assert_eq!(s.pop_due(100), Some((100, Task::Pop(2))));
    }

    #[test]
    fn test_cancel_and_clear() {
        let mut s = Scheduler::new();
        let spawn = s.every(0, 100, Task::Spawn);
        let pop = s.once(0, 50, Task::Pop(3));
        assert!(s.cancel(pop));
        assert!(!s.cancel(pop));
        assert_eq!(s.pop_due(100), Some((100, Task::Spawn)));
        assert!(s.cancel(spawn));
        assert!(s.is_empty());

        s.every(0, 100, Task::Tick);
        s.once(0, 10, Task::Pop(4));
        s.clear();
        assert_eq!(s.pop_due(u64::MAX), None);
    }

    #[test]
    fn test_far_future_times_saturate() {
        let mut s = Scheduler::new();
        s.once(u64::MAX - 1, 5, Task::Pop(1));
        s.every(u64::MAX - 10, 100, Task::Tick);
        assert_eq!(s.pop_due(u64::MAX), Some((u64::MAX, Task::Pop(1))));
        assert_eq!(s.pop_due(u64::MAX), Some((u64::MAX, Task::Tick)));
        assert_eq!(s.len(), 1);
    }
}
