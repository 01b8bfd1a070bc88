//! # Repeat: re-run a task while its output passes a predicate.
//!
//! ```text
//! run(v0)
//!   ├─ predicate(v0) false ─► Ok(v0)            (zero rounds)
//!   └─ true ─► round 1: task(v0) ─► Ok(v1)
//!                ├─ predicate(v1) true  ─► round 2: task(v1) ─► ...
//!                └─ predicate(v1) false ─► Ok(v1)
//!            any round Err(e) ─► Err(e) unchanged, no further rounds
//! ```
//!
//! Rounds run strictly one after another. Rounds that complete synchronously
//! are looped, not nested, so long chains do not grow the stack.

use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use crate::combinators::activation::Activation;
use crate::events::{Bus, Event, EventKind, emit};
use crate::{Callback, Outcome, Task, TaskRef};

/// Task re-running `task` while `predicate` holds for the latest value.
pub struct Repeat<T> {
    predicate: Rc<dyn Fn(&T) -> bool>,
    task: TaskRef<T, T>,
    bus: Option<Bus>,
}

/// Returns a task that re-runs `task` while `predicate` holds.
///
/// ```
/// use requestors::{repeat, unary, Callback, TaskExt};
///
/// let inc = unary(|n: u32| Ok::<_, String>(n + 1));
/// let count_to_three = repeat(|n: &u32| *n < 3, inc);
/// count_to_three.start(0, Callback::new(|o| assert_eq!(o, Ok(3))));
/// ```
pub fn repeat<T, P>(predicate: P, task: impl Task<T, T>) -> Repeat<T>
where
    T: 'static,
    P: Fn(&T) -> bool + 'static,
{
    Repeat {
        predicate: Rc::new(predicate),
        task: Rc::new(task),
        bus: None,
    }
}

impl<T> Repeat<T> {
    /// Publishes round/settlement events to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }
}

impl<T: 'static> Task<T, T> for Repeat<T> {
    fn name(&self) -> &str {
        "repeat"
    }

    fn run(&self, ctx: CancellationToken, input: T, done: Callback<T>) {
        let done = done.guarded(&ctx);
        if !(self.predicate)(&input) {
            emit(self.bus.as_ref(), || {
                Event::new(EventKind::Settled)
                    .with_task("repeat")
                    .with_round(0)
            });
            done.succeed(input);
            return;
        }

        let rounds = Rc::new(Rounds {
            predicate: self.predicate.clone(),
            task: self.task.clone(),
            act: Activation::new("repeat", ctx, self.bus.clone(), done),
        });
        rounds.pump(input);
    }
}

/// State of one `Repeat` activation.
struct Rounds<T> {
    predicate: Rc<dyn Fn(&T) -> bool>,
    task: TaskRef<T, T>,
    act: Activation<T, T>,
}

impl<T: 'static> Rounds<T> {
    fn pump(self: &Rc<Self>, value: T) {
        if !self.act.enqueue(value) {
            return;
        }
        while let Some((round, input)) = self.act.next_round() {
            let this = Rc::clone(self);
            self.task
                .run(round, input, Callback::new(move |o| this.on_round(o)));
        }
        self.act.release();
    }

    fn on_round(self: &Rc<Self>, outcome: Outcome<T>) {
        if self.act.suppressed() {
            return;
        }
        match outcome {
            Err(err) => self.act.fail(err),
            Ok(value) => {
                self.act.round_succeeded();
                if (self.predicate)(&value) {
                    self.pump(value);
                } else {
                    self.act.succeed(value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::TaskError;
    use crate::testing::{Deferred, Probe};
    use crate::{Bus, TaskExt, TaskFn, unary};

    fn counting_inc(calls: Rc<Cell<u32>>) -> TaskRef<u32, u32> {
        TaskFn::rc("inc", move |_ctx: CancellationToken, n: u32, done: Callback<u32>| {
            calls.set(calls.get() + 1);
            done.succeed(n + 1);
        })
    }

    #[test]
    fn runs_until_predicate_fails() {
        let calls = Rc::new(Cell::new(0));
        let probe = Probe::new();
        repeat(|n: &u32| *n < 3, counting_inc(calls.clone())).start(0, probe.callback());

        assert_eq!(calls.get(), 3);
        assert_eq!(probe.outcomes(), vec![Ok(3)]);
    }

    #[test]
    fn initial_value_failing_predicate_skips_the_task() {
        let calls = Rc::new(Cell::new(0));
        let probe = Probe::new();
        repeat(|n: &u32| *n < 3, counting_inc(calls.clone())).start(5, probe.callback());

        assert_eq!(calls.get(), 0);
        assert_eq!(probe.outcomes(), vec![Ok(5)]);
    }

    #[test]
    fn long_synchronous_chains_do_not_recurse() {
        let probe = Probe::new();
        let inc = unary(|n: u64| Ok::<_, String>(n + 1));
        repeat(|n: &u64| *n < 200_000, inc).start(0, probe.callback());
        assert_eq!(probe.outcomes(), vec![Ok(200_000)]);
    }

    #[test]
    fn failure_short_circuits_with_same_reason() {
        let probe = Probe::new();
        let flaky = unary(|n: u32| {
            if n == 4 {
                Err("stuck at four".to_string())
            } else {
                Ok(n + 1)
            }
        });
        repeat(|_: &u32| true, flaky).start(0, probe.callback());
        assert_eq!(probe.outcomes(), vec![Err(TaskError::fail("stuck at four"))]);
    }

    #[test]
    fn cancel_reaches_the_live_round() {
        let deferred = Deferred::<u32, u32>::new();
        let probe = Probe::new();
        let handle = repeat(|n: &u32| *n < 10, deferred.task()).start(0, probe.callback());

        deferred.settle(|n| Ok(n + 1));
        deferred.settle(|n| Ok(n + 1));
        assert_eq!(deferred.started(), 3);

        let live = deferred.token(0);
        assert!(!live.is_cancelled());
        handle.cancel();
        assert!(live.is_cancelled());

        deferred.settle(|n| Ok(n + 1));
        handle.cancel();
        assert_eq!(deferred.started(), 3);
        assert_eq!(probe.count(), 0);
    }

    #[test]
    fn events_track_rounds() {
        let bus = Bus::new(32);
        let mut rx = bus.subscribe();
        let inc = unary(|n: u32| Ok::<_, String>(n + 1));
        repeat(|n: &u32| *n < 2, inc)
            .with_bus(bus)
            .start(0, Probe::new().callback());

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::RoundStarted,
                EventKind::RoundSucceeded,
                EventKind::RoundStarted,
                EventKind::RoundSucceeded,
                EventKind::Settled,
            ]
        );
    }
}
