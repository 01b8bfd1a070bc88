//! # Wait: poll a predicate on an interval, optionally under a deadline.
//!
//! ```text
//! run(input) ─► arm interval (+ deadline when configured)
//!                  │                        │
//!          tick: predicate()?          deadline fires
//!            ├─ false ─► keep polling       └─► stop interval ─► Err(Timeout)
//!            └─ true  ─► stop both ─► Ok(input, or the configured value)
//!
//! arming fails ─► Err(Timer { reason })
//! cancel       ─► both timers stop, no outcome
//! ```
//!
//! Both timers are armed under one child token of the activation. Settling or
//! cancelling cancels that token, which releases whatever is still armed.
//! Without a deadline, a predicate that never holds polls forever.

use std::cell::{Cell, RefCell};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use tokio_util::sync::CancellationToken;

use crate::error::{ConfigError, TaskError};
use crate::events::{Bus, Event, EventKind, emit};
use crate::subscribers::panic_info;
use crate::timers::{Timers, TokioTimers};
use crate::{Callback, Task};

/// Builder for [`Wait`].
pub struct WaitBuilder<V> {
    predicate: Option<Rc<dyn Fn() -> bool>>,
    interval: Option<Duration>,
    timeout: Option<Duration>,
    timers: Rc<dyn Timers>,
    value: Rc<dyn Fn() -> V>,
    bus: Option<Bus>,
}

/// Starts configuring a polling task.
///
/// On success the task reports its input, or, when invoked with `None`, the
/// configured value (by default the current [`SystemTime`]).
///
/// ```
/// use std::{cell::Cell, rc::Rc, time::Duration};
/// use requestors::{wait, Callback, ManualClock, TaskExt};
///
/// let clock = ManualClock::new();
/// let ready = Rc::new(Cell::new(false));
/// let r = ready.clone();
///
/// let task = wait()
///     .predicate(move || r.get())
///     .interval(Duration::from_millis(10))
///     .timers(clock.clone())
///     .value(0)
///     .build()
///     .unwrap();
///
/// task.start(Some(7), Callback::new(|o| assert_eq!(o, Ok(7))));
/// ready.set(true);
/// clock.advance(Duration::from_millis(10));
/// ```
pub fn wait() -> WaitBuilder<SystemTime> {
    WaitBuilder {
        predicate: None,
        interval: None,
        timeout: None,
        timers: Rc::new(TokioTimers),
        value: Rc::new(SystemTime::now),
        bus: None,
    }
}

impl<V: 'static> WaitBuilder<V> {
    /// Sets the polled predicate.
    pub fn predicate(mut self, f: impl Fn() -> bool + 'static) -> Self {
        self.predicate = Some(Rc::new(f));
        self
    }

    /// Sets a predicate evaluated against fixed `args` on every tick.
    pub fn predicate_with<A: 'static>(mut self, args: A, f: impl Fn(&A) -> bool + 'static) -> Self {
        self.predicate = Some(Rc::new(move || f(&args)));
        self
    }

    /// Sets the polling period.
    pub fn interval(mut self, period: Duration) -> Self {
        self.interval = Some(period);
        self
    }

    /// Fails the activation with [`TaskError::Timeout`] once `deadline` elapses.
    pub fn timeout(mut self, deadline: Duration) -> Self {
        self.timeout = Some(deadline);
        self
    }

    /// Replaces the default [`TokioTimers`].
    pub fn timers(mut self, timers: impl Timers + 'static) -> Self {
        self.timers = Rc::new(timers);
        self
    }

    /// Value reported when the task is invoked with `None`.
    pub fn value<U: Clone + 'static>(self, value: U) -> WaitBuilder<U> {
        self.value_with(move || value.clone())
    }

    /// Computes the value reported for a `None` input, lazily on success.
    pub fn value_with<U: 'static>(self, f: impl Fn() -> U + 'static) -> WaitBuilder<U> {
        WaitBuilder {
            predicate: self.predicate,
            interval: self.interval,
            timeout: self.timeout,
            timers: self.timers,
            value: Rc::new(f),
            bus: self.bus,
        }
    }

    /// Publishes polling events to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// - [`ConfigError::MissingPredicate`] when no predicate was set
    /// - [`ConfigError::MissingInterval`] when no interval was set
    /// - [`ConfigError::ZeroInterval`] when the interval is zero
    pub fn build(self) -> Result<Wait<V>, ConfigError> {
        let predicate = self.predicate.ok_or(ConfigError::MissingPredicate)?;
        let interval = self.interval.ok_or(ConfigError::MissingInterval)?;
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(Wait {
            predicate,
            interval,
            timeout: self.timeout,
            timers: self.timers,
            value: self.value,
            bus: self.bus,
        })
    }
}

/// Polling task; see [`wait`].
pub struct Wait<V> {
    predicate: Rc<dyn Fn() -> bool>,
    interval: Duration,
    timeout: Option<Duration>,
    timers: Rc<dyn Timers>,
    value: Rc<dyn Fn() -> V>,
    bus: Option<Bus>,
}

impl<V: 'static> Task<Option<V>, V> for Wait<V> {
    fn name(&self) -> &str {
        "wait"
    }

    fn run(&self, ctx: CancellationToken, input: Option<V>, done: Callback<V>) {
        let poll = Rc::new(Poll {
            scope: ctx.child_token(),
            done: RefCell::new(Some(done.guarded(&ctx))),
            input: RefCell::new(input),
            value: self.value.clone(),
            ticks: Cell::new(0),
            bus: self.bus.clone(),
        });

        let p = poll.clone();
        let predicate = self.predicate.clone();
        let armed = self
            .timers
            .set_interval(&poll.scope, self.interval, Box::new(move || p.tick(&*predicate)));
        if let Err(err) = armed {
            poll.timer_failed(err.into());
            return;
        }

        if let Some(deadline) = self.timeout {
            let p = poll.clone();
            let armed = self
                .timers
                .set_timeout(&poll.scope, deadline, Box::new(move || p.expire(deadline)));
            if let Err(err) = armed {
                poll.timer_failed(err.into());
            }
        }
    }
}

/// State of one `Wait` activation.
struct Poll<V> {
    /// Parent of both timers.
    scope: CancellationToken,
    done: RefCell<Option<Callback<V>>>,
    input: RefCell<Option<V>>,
    value: Rc<dyn Fn() -> V>,
    ticks: Cell<u32>,
    bus: Option<Bus>,
}

impl<V: 'static> Poll<V> {
    fn tick(&self, predicate: &dyn Fn() -> bool) {
        if self.scope.is_cancelled() {
            return;
        }
        self.ticks.set(self.ticks.get() + 1);

        match catch_unwind(AssertUnwindSafe(predicate)) {
            Ok(false) => {}
            Ok(true) => {
                let Some(done) = self.settle() else { return };
                emit(self.bus.as_ref(), || {
                    Event::new(EventKind::PollSatisfied)
                        .with_task("wait")
                        .with_round(self.ticks.get())
                });
                let input = self.input.borrow_mut().take();
                let value = match input {
                    Some(v) => Ok(v),
                    None => catch_unwind(AssertUnwindSafe(|| (self.value)())),
                };
                match value {
                    Ok(v) => done.succeed(v),
                    Err(panic_err) => done.fail(TaskError::Panicked {
                        info: panic_info(&*panic_err),
                    }),
                }
            }
            Err(panic_err) => {
                if let Some(done) = self.settle() {
                    done.fail(TaskError::Panicked {
                        info: panic_info(&*panic_err),
                    });
                }
            }
        }
    }

    fn expire(&self, deadline: Duration) {
        let Some(done) = self.settle() else { return };
        emit(self.bus.as_ref(), || {
            Event::new(EventKind::TimeoutHit)
                .with_task("wait")
                .with_timeout(deadline)
        });
        done.fail(TaskError::Timeout);
    }

    fn timer_failed(&self, err: TaskError) {
        let Some(done) = self.settle() else { return };
        emit(self.bus.as_ref(), || {
            Event::new(EventKind::TimerFailed)
                .with_task("wait")
                .with_reason(err.reason())
        });
        done.fail(err);
    }

    /// Stops both timers and takes the callback, once.
    fn settle(&self) -> Option<Callback<V>> {
        self.scope.cancel();
        self.done.borrow_mut().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimerError;
    use crate::testing::Probe;
    use crate::{ManualClock, TaskExt};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn flag() -> Rc<Cell<bool>> {
        Rc::new(Cell::new(false))
    }

    #[test]
    fn succeeds_on_first_satisfied_tick() {
        let clock = ManualClock::new();
        let probe = Probe::new();
        let task = wait()
            .predicate(|| true)
            .interval(ms(10))
            .timers(clock.clone())
            .value("fallback")
            .build()
            .expect("valid");

        task.start(Some("ready"), probe.callback());
        clock.advance(ms(9));
        assert_eq!(probe.count(), 0);
        clock.advance(ms(1));
        assert_eq!(probe.outcomes(), vec![Ok("ready")]);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn times_out_at_the_deadline_never_earlier() {
        let clock = ManualClock::new();
        let probe = Probe::<u8>::new();
        let task = wait()
            .predicate(|| false)
            .interval(ms(10))
            .timeout(ms(30))
            .timers(clock.clone())
            .value(0u8)
            .build()
            .expect("valid");

        task.start(None, probe.callback());
        clock.advance(ms(29));
        assert_eq!(probe.count(), 0);
        clock.advance(ms(1));
        assert_eq!(probe.outcomes(), vec![Err(TaskError::Timeout)]);
        assert_eq!(probe.outcomes()[0].clone().unwrap_err().to_string(), "Timeout exceeded");
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn absent_input_reports_lazily_computed_value() {
        let clock = ManualClock::new();
        let computed = Rc::new(Cell::new(0));
        let c = computed.clone();
        let probe = Probe::new();
        let task = wait()
            .predicate_with(vec![1, 2, 3], |args: &Vec<i32>| args.len() == 3)
            .interval(ms(5))
            .timers(clock.clone())
            .value_with(move || {
                c.set(c.get() + 1);
                "computed"
            })
            .build()
            .expect("valid");

        task.start(None, probe.callback());
        assert_eq!(computed.get(), 0);
        clock.advance(ms(5));
        assert_eq!(computed.get(), 1);
        assert_eq!(probe.outcomes(), vec![Ok("computed")]);
    }

    #[test]
    fn default_value_is_a_timestamp() {
        let clock = ManualClock::new();
        let probe = Probe::new();
        let before = SystemTime::now();
        wait()
            .predicate(|| true)
            .interval(ms(1))
            .timers(clock.clone())
            .build()
            .expect("valid")
            .start(None, probe.callback());
        clock.advance(ms(1));

        let stamp = probe.outcomes()[0].clone().expect("success");
        assert!(stamp >= before);
    }

    #[test]
    fn cancel_releases_timers_and_suppresses_outcome() {
        let clock = ManualClock::new();
        let ready = flag();
        let r = ready.clone();
        let probe = Probe::new();
        let handle = wait()
            .predicate(move || r.get())
            .interval(ms(10))
            .timeout(ms(100))
            .timers(clock.clone())
            .value(0)
            .build()
            .expect("valid")
            .start(Some(1), probe.callback());

        assert_eq!(clock.pending(), 2);
        clock.advance(ms(20));
        handle.cancel();
        handle.cancel();
        assert_eq!(clock.pending(), 0);

        ready.set(true);
        clock.advance(ms(200));
        assert_eq!(probe.count(), 0);
    }

    #[test]
    fn timer_setup_failure_is_reported() {
        let clock = ManualClock::new();
        clock.exhaust();
        let probe = Probe::<u8>::new();
        wait()
            .predicate(|| true)
            .interval(ms(10))
            .timers(clock.clone())
            .value(1u8)
            .build()
            .expect("valid")
            .start(None, probe.callback());

        assert_eq!(
            probe.outcomes(),
            vec![Err(TaskError::from(TimerError::Exhausted))]
        );
    }

    #[test]
    fn predicate_panic_becomes_failure() {
        let clock = ManualClock::new();
        let probe = Probe::<u8>::new();
        wait()
            .predicate(|| panic!("sensor offline"))
            .interval(ms(10))
            .timers(clock.clone())
            .value(1u8)
            .build()
            .expect("valid")
            .start(None, probe.callback());
        clock.advance(ms(10));

        assert_eq!(
            probe.outcomes(),
            vec![Err(TaskError::Panicked {
                info: "sensor offline".to_string()
            })]
        );
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn missing_configuration_fails_construction() {
        assert_eq!(
            wait().interval(ms(1)).build().err(),
            Some(ConfigError::MissingPredicate)
        );
        assert_eq!(
            wait().predicate(|| true).build().err(),
            Some(ConfigError::MissingInterval)
        );
        assert_eq!(
            wait().predicate(|| true).interval(Duration::ZERO).build().err(),
            Some(ConfigError::ZeroInterval)
        );
    }

    #[test]
    fn events_report_satisfied_tick_count() {
        let clock = ManualClock::new();
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let ticks = Rc::new(Cell::new(0));
        let t = ticks.clone();
        wait()
            .predicate(move || {
                t.set(t.get() + 1);
                t.get() == 3
            })
            .interval(ms(10))
            .timers(clock.clone())
            .with_bus(bus)
            .value(())
            .build()
            .expect("valid")
            .start(None, Probe::new().callback());
        clock.advance(ms(50));

        let ev = rx.try_recv().expect("event");
        assert_eq!(ev.kind, EventKind::PollSatisfied);
        assert_eq!(ev.round, Some(3));
    }

    #[tokio::test]
    async fn tokio_timers_without_local_set_fail_the_task() {
        let probe = Probe::<u8>::new();
        wait()
            .predicate(|| true)
            .interval(ms(5))
            .value(1u8)
            .build()
            .expect("valid")
            .start(None, probe.callback());

        assert_eq!(
            probe.outcomes(),
            vec![Err(TaskError::from(TimerError::NoLocalSet))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timers_settle_and_release() {
        let local = tokio::task::LocalSet::new();
        let ready = Probe::<&'static str>::new();
        let stuck = Probe::<()>::new();
        let cancelled = Probe::<()>::new();

        local
            .run_until(async {
                wait()
                    .predicate(|| true)
                    .interval(ms(10))
                    .value("ready")
                    .build()
                    .expect("valid")
                    .start(None, ready.callback());

                let never = wait()
                    .predicate(|| false)
                    .interval(ms(10))
                    .timeout(ms(30))
                    .value(())
                    .build()
                    .expect("valid");
                never.start(None, stuck.callback());
                let handle = never.start(None, cancelled.callback());

                tokio::time::sleep(ms(15)).await;
                handle.cancel();
                tokio::time::sleep(ms(10)).await;
                assert_eq!(stuck.count(), 0);
                tokio::time::sleep(ms(100)).await;
            })
            .await;

        assert_eq!(ready.outcomes(), vec![Ok("ready")]);
        assert_eq!(stuck.outcomes(), vec![Err(TaskError::Timeout)]);
        assert_eq!(cancelled.count(), 0);
    }
}
