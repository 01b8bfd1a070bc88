//! # Events emitted by combinator activations.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Iteration events**: rounds of `repeat`/`chained` (started, succeeded, failed, settled)
//! - **Polling events**: `wait` outcomes (predicate satisfied, deadline hit, timer failure)
//! - **Delivery events**: fan-out delegation, suppressed late outcomes, subscriber health
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! round number and failure reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use requestors::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("repeat")
//!     .with_reason("boom")
//!     .with_round(3);
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("repeat"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of combinator events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Iteration events ===
    /// An iteration combinator invoked its inner task for another round.
    ///
    /// Sets:
    /// - `task`: combinator name
    /// - `round`: round number (1-based, per activation)
    RoundStarted,

    /// A round reported success and the combinator evaluated its predicate.
    ///
    /// Sets:
    /// - `task`: combinator name
    /// - `round`: round number
    RoundSucceeded,

    /// The inner task failed; the failure is propagated unchanged.
    ///
    /// Sets:
    /// - `task`: combinator name
    /// - `round`: round number (when raised by an iteration combinator)
    /// - `reason`: failure reason
    TaskFailed,

    /// The activation reported its final success.
    ///
    /// Sets:
    /// - `task`: combinator name
    /// - `round`: number of rounds that ran
    Settled,

    /// An outcome arrived after its activation was cancelled and was dropped.
    ///
    /// Sets:
    /// - `task`: combinator name
    OutcomeSuppressed,

    // === Polling events ===
    /// The polled predicate returned `true`.
    ///
    /// Sets:
    /// - `task`: combinator name
    /// - `round`: number of ticks evaluated
    PollSatisfied,

    /// The polling deadline elapsed first.
    ///
    /// Sets:
    /// - `task`: combinator name
    /// - `timeout_ms`: configured deadline (ms)
    TimeoutHit,

    /// Arming a timer failed.
    ///
    /// Sets:
    /// - `task`: combinator name
    /// - `reason`: timer collaborator's message
    TimerFailed,

    // === Delivery events ===
    /// A fan-out adapter handed a collection of tasks to the engine.
    ///
    /// Sets:
    /// - `task`: engine primitive name
    /// - `count`: number of tasks submitted
    Delegated,

    /// The engine was asked for constraints it does not implement.
    ///
    /// Sets:
    /// - `task`: engine primitive name
    /// - `reason`: which options were ignored
    OptionsNotHonored,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber listener fell behind and skipped events.
    ///
    /// Sets:
    /// - `count`: number of skipped events
    SubscriberLagged,
}

/// Combinator event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the emitting task or primitive, if applicable.
    pub task: Option<Arc<str>>,
    /// Round or tick count (starting from 1).
    pub round: Option<u32>,
    /// Human-readable reason (failures, ignored options, panics).
    pub reason: Option<Arc<str>>,
    /// Deadline in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Collection size or skipped-event count.
    pub count: Option<u64>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            round: None,
            reason: None,
            timeout_ms: None,
            count: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a round number.
    #[inline]
    pub fn with_round(mut self, n: u32) -> Self {
        self.round = Some(n);
        self
    }

    /// Attaches a deadline (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches a count.
    #[inline]
    pub fn with_count(mut self, n: u64) -> Self {
        self.count = Some(n);
        self
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    /// Returns `true` for [`EventKind::SubscriberPanicked`], letting a
    /// subscriber skip reports about its own failures.
    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::RoundStarted);
        let b = Event::new(EventKind::RoundStarted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn timeout_is_stored_in_millis() {
        let ev = Event::new(EventKind::TimeoutHit).with_timeout(Duration::from_secs(2));
        assert_eq!(ev.timeout_ms, Some(2000));
    }

    #[test]
    fn panic_helper_sets_fields() {
        let ev = Event::subscriber_panicked("audit", "boom".into());
        assert!(ev.is_subscriber_panic());
        assert_eq!(ev.task.as_deref(), Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
    }
}
