//! # Timer collaborator.
//!
//! The polling combinator never touches a clock directly; it arms timers
//! through a [`Timers`] implementation:
//! - [`TokioTimers`] - real timers on the current `tokio::task::LocalSet`
//! - [`ManualClock`] - virtual time advanced explicitly, for deterministic tests
//!
//! Each timer is armed under a `scope` token and controlled by a
//! [`TimerHandle`] holding a child of that scope. Cancelling either the handle
//! or the scope stops the timer; cancelling twice, or after a one-shot timer
//! fired, is a no-op.

mod manual;
mod tokio_timers;

use std::rc::Rc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::TimerError;

pub use manual::ManualClock;
pub use tokio_timers::TokioTimers;
pub(crate) use tokio_timers::spawn_local;

/// Timer primitives consumed by [`Wait`](crate::Wait).
pub trait Timers {
    /// Calls `tick` every `period`, first after one full period, until the
    /// handle or `scope` is cancelled.
    fn set_interval(
        &self,
        scope: &CancellationToken,
        period: Duration,
        tick: Box<dyn FnMut()>,
    ) -> Result<TimerHandle, TimerError>;

    /// Calls `fire` once after `delay`, unless the handle or `scope` is
    /// cancelled first.
    fn set_timeout(
        &self,
        scope: &CancellationToken,
        delay: Duration,
        fire: Box<dyn FnOnce()>,
    ) -> Result<TimerHandle, TimerError>;
}

impl<T: Timers + ?Sized> Timers for Rc<T> {
    fn set_interval(
        &self,
        scope: &CancellationToken,
        period: Duration,
        tick: Box<dyn FnMut()>,
    ) -> Result<TimerHandle, TimerError> {
        (**self).set_interval(scope, period, tick)
    }

    fn set_timeout(
        &self,
        scope: &CancellationToken,
        delay: Duration,
        fire: Box<dyn FnOnce()>,
    ) -> Result<TimerHandle, TimerError> {
        (**self).set_timeout(scope, delay, fire)
    }
}

/// Cancellation handle of one armed timer.
#[derive(Clone, Debug)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    /// Wraps the token the timer implementation watches.
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Stops the timer.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the timer was stopped.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
