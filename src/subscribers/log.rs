//! # Logging subscriber.
//!
//! [`LogWriter`] renders events through `tracing`. Iteration and polling
//! progress goes to `debug`, failures and timeouts to `warn`, subscriber
//! health to `error`.
//!
//! ## Example
//! ```no_run
//! # use std::rc::Rc;
//! # use requestors::{Bus, LogWriter, Subscribe};
//! # async fn demo(bus: Bus) {
//! let subs: Vec<Rc<dyn Subscribe>> = vec![Rc::new(LogWriter)];
//! requestors::subscribers::listen(bus.subscribe(), subs).await;
//! # }
//! ```

use crate::Subscribe;
use crate::events::{Event, EventKind};

/// `tracing`-backed logging subscriber.
///
/// Enabled via the `logging` feature.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogWriter;

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::RoundStarted => {
                tracing::debug!(seq = e.seq, task, round = ?e.round, "round started");
            }
            EventKind::RoundSucceeded => {
                tracing::debug!(seq = e.seq, task, round = ?e.round, "round succeeded");
            }
            EventKind::TaskFailed => {
                tracing::warn!(seq = e.seq, task, round = ?e.round, reason = ?e.reason, "task failed");
            }
            EventKind::Settled => {
                tracing::debug!(seq = e.seq, task, rounds = ?e.round, "settled");
            }
            EventKind::OutcomeSuppressed => {
                tracing::debug!(seq = e.seq, task, "outcome after cancellation dropped");
            }
            EventKind::PollSatisfied => {
                tracing::debug!(seq = e.seq, task, ticks = ?e.round, "predicate satisfied");
            }
            EventKind::TimeoutHit => {
                tracing::warn!(seq = e.seq, task, timeout_ms = ?e.timeout_ms, "timeout exceeded");
            }
            EventKind::TimerFailed => {
                tracing::warn!(seq = e.seq, task, reason = ?e.reason, "timer setup failed");
            }
            EventKind::Delegated => {
                tracing::debug!(seq = e.seq, task, count = ?e.count, "delegated to engine");
            }
            EventKind::OptionsNotHonored => {
                tracing::warn!(seq = e.seq, task, reason = ?e.reason, "options not honored");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(seq = e.seq, subscriber = task, info = ?e.reason, "subscriber panicked");
            }
            EventKind::SubscriberLagged => {
                tracing::error!(seq = e.seq, skipped = ?e.count, "subscriber lagged");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
