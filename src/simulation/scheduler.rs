//! Discrete-event clock driving one experiment run.
//!
//! Events are kept in a binary heap ordered by virtual time; events that share
//! a timestamp execute in the order they were scheduled (a monotonically
//! increasing sequence number breaks ties). Virtual time only advances between
//! events, and there is no cancellation: once scheduled, an event fires unless
//! the scheduler is reset first.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use super::types::NodeId;

/// An event scheduled for execution at a specific virtual time.
#[derive(Debug)]
pub struct ScheduledEvent<E> {
    time: Duration,
    sequence: u64,
    target: NodeId,
    event: E,
}

impl<E> PartialEq for ScheduledEvent<E> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.sequence == other.sequence
    }
}

impl<E> Eq for ScheduledEvent<E> {}

impl<E> PartialOrd for ScheduledEvent<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for ScheduledEvent<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max heap; reverse both keys so the earliest time and,
        // within one time, the earliest sequence pops first.
        match other.time.cmp(&self.time) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            ordering => ordering,
        }
    }
}

/// Summary of one `run_until_idle` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of events dispatched.
    pub executed: u64,
    /// Virtual time of the last dispatched event.
    pub finished_at: Duration,
    /// Events left pending because they fall after the horizon.
    pub pending: usize,
}

/// Single-threaded discrete-event scheduler.
///
/// The event payload `E` is chosen by the owner; the scheduler only orders
/// and hands events back through the dispatch closure of `run_until_idle`.
#[derive(Debug)]
pub struct Scheduler<E> {
    now: Duration,
    next_sequence: u64,
    queue: BinaryHeap<ScheduledEvent<E>>,
    horizon: Option<Duration>,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_sequence: 0,
            queue: BinaryHeap::new(),
            horizon: None,
        }
    }

    /// Create a scheduler that stops dispatching past `horizon`.
    pub fn with_horizon(horizon: Option<Duration>) -> Self {
        Self { horizon, ..Self::new() }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `event` for `target` at `now + delay`.
    pub fn schedule(&mut self, delay: Duration, target: NodeId, event: E) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.push(ScheduledEvent {
            time: self.now + delay,
            sequence,
            target,
            event,
        });
    }

    /// Number of events waiting to fire.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pop the earliest event and advance the clock to its time.
    ///
    /// Returns `None` when the queue is empty or the next event lies past the
    /// horizon; in the latter case the event stays queued.
    pub fn next_event(&mut self) -> Option<(NodeId, E)> {
        let next_time = self.queue.peek()?.time;
        if let Some(horizon) = self.horizon {
            if next_time > horizon {
                return None;
            }
        }
        let scheduled = self.queue.pop()?;
        self.now = scheduled.time;
        Some((scheduled.target, scheduled.event))
    }

    /// Dispatch events in time order until none remain or the horizon is hit.
    ///
    /// The dispatch closure receives the scheduler so handlers can schedule
    /// follow-up events (this is how self-rescheduling state machines chain).
    pub fn run_until_idle<F>(&mut self, mut dispatch: F) -> RunSummary
    where
        F: FnMut(&mut Self, NodeId, E),
    {
        let mut executed = 0;
        while let Some((target, event)) = self.next_event() {
            dispatch(self, target, event);
            executed += 1;
        }
        RunSummary {
            executed,
            finished_at: self.now,
            pending: self.queue.len(),
        }
    }

    /// Drop every pending event and rewind the clock to zero.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.now = Duration::ZERO;
        self.next_sequence = 0;
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_fire_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_millis(300), 0, "c");
        scheduler.schedule(Duration::from_millis(100), 1, "a");
        scheduler.schedule(Duration::from_millis(200), 2, "b");

        let mut fired = Vec::new();
        let summary = scheduler.run_until_idle(|s, target, event| fired.push((s.now(), target, event)));

        assert_eq!(
            fired,
            vec![
                (Duration::from_millis(100), 1, "a"),
                (Duration::from_millis(200), 2, "b"),
                (Duration::from_millis(300), 0, "c"),
            ]
        );
        assert_eq!(summary.executed, 3);
        assert_eq!(summary.finished_at, Duration::from_millis(300));
        assert_eq!(summary.pending, 0);
    }

    #[test]
    fn same_time_events_fire_in_enqueue_order() {
        let mut scheduler = Scheduler::new();
        for i in 0..10u32 {
            scheduler.schedule(Duration::from_secs(1), i, i);
        }
        let mut fired = Vec::new();
        scheduler.run_until_idle(|_, _, event| fired.push(event));
        assert_eq!(fired, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn handlers_can_reschedule_relative_to_now() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_millis(500), 7, 0u32);

        let mut times = Vec::new();
        scheduler.run_until_idle(|s, target, count| {
            times.push(s.now());
            if count < 3 {
                s.schedule(Duration::from_millis(1500), target, count + 1);
            }
        });

        assert_eq!(
            times,
            vec![
                Duration::from_millis(500),
                Duration::from_millis(2000),
                Duration::from_millis(3500),
                Duration::from_millis(5000),
            ]
        );
    }

    #[test]
    fn horizon_leaves_late_events_pending() {
        let mut scheduler = Scheduler::with_horizon(Some(Duration::from_secs(2)));
        scheduler.schedule(Duration::from_secs(1), 0, ());
        scheduler.schedule(Duration::from_secs(2), 0, ());
        scheduler.schedule(Duration::from_secs(3), 0, ());

        let summary = scheduler.run_until_idle(|_, _, _| {});
        assert_eq!(summary.executed, 2);
        assert_eq!(summary.pending, 1);
        assert_eq!(scheduler.now(), Duration::from_secs(2));
    }

    #[test]
    fn reset_clears_queue_and_clock() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_secs(1), 0, ());
        scheduler.schedule(Duration::from_secs(5), 0, ());
        assert!(scheduler.next_event().is_some());
        assert_eq!(scheduler.now(), Duration::from_secs(1));
        assert_eq!(scheduler.pending(), 1);

        scheduler.reset();
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.now(), Duration::ZERO);
    }
}
