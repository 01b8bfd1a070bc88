//! # Chained: iterate a task while folding its outputs into an accumulator.
//!
//! Built in two steps, mirroring a factory that is configured once and then
//! applied to tasks:
//!
//! ```text
//! chained().continuer(c).aggregator(g).build()?   ─► ChainedFactory
//! factory.over(task)                              ─► Chained (a Task<A, A>)
//!
//! run(acc0)
//!   round 1: task(acc0) ─► Ok(b1) ─► acc1 = g(&acc0, b1)
//!              ├─ c(&acc1) true  ─► round 2: task(acc1) ─► ...
//!              └─ c(&acc1) false ─► Ok(acc1)
//!   any round Err(e) ─► Err(e) unchanged
//! ```
//!
//! Unlike [`repeat`](crate::repeat), the first round always runs and the
//! continuation test looks at the accumulated value, not the raw output.

use std::cell::RefCell;
use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use crate::combinators::activation::Activation;
use crate::error::ConfigError;
use crate::events::Bus;
use crate::{Callback, Outcome, Task, TaskRef};

type Continuer<A> = Rc<dyn Fn(&A) -> bool>;
type Aggregator<A, B> = Rc<dyn Fn(&A, B) -> A>;

/// Builder for [`ChainedFactory`].
pub struct ChainedBuilder<A, B> {
    continuer: Option<Continuer<A>>,
    aggregator: Option<Aggregator<A, B>>,
    bus: Option<Bus>,
}

/// Starts configuring a chained iteration.
///
/// ```
/// use requestors::{chained, constant, Callback, TaskExt};
///
/// let sum_threes = chained()
///     .continuer(|acc: &u32| *acc < 10)
///     .aggregator(|acc: &u32, b: u32| acc + b)
///     .build()
///     .unwrap()
///     .over(constant(3u32));
///
/// sum_threes.start(0, Callback::new(|o| assert_eq!(o, Ok(12))));
/// ```
pub fn chained<A, B>() -> ChainedBuilder<A, B> {
    ChainedBuilder {
        continuer: None,
        aggregator: None,
        bus: None,
    }
}

impl<A, B> ChainedBuilder<A, B> {
    /// Sets the predicate deciding, from the accumulated value, whether another round runs.
    pub fn continuer(mut self, f: impl Fn(&A) -> bool + 'static) -> Self {
        self.continuer = Some(Rc::new(f));
        self
    }

    /// Sets the function folding a round's output into the accumulator.
    pub fn aggregator(mut self, f: impl Fn(&A, B) -> A + 'static) -> Self {
        self.aggregator = Some(Rc::new(f));
        self
    }

    /// Publishes round/settlement events to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// [`ConfigError::MissingContinuer`] or [`ConfigError::MissingAggregator`].
    pub fn build(self) -> Result<ChainedFactory<A, B>, ConfigError> {
        let continuer = self.continuer.ok_or(ConfigError::MissingContinuer)?;
        let aggregator = self.aggregator.ok_or(ConfigError::MissingAggregator)?;
        Ok(ChainedFactory {
            continuer,
            aggregator,
            bus: self.bus,
        })
    }
}

/// Validated configuration; applies to any number of tasks.
pub struct ChainedFactory<A, B> {
    continuer: Continuer<A>,
    aggregator: Aggregator<A, B>,
    bus: Option<Bus>,
}

impl<A, B> Clone for ChainedFactory<A, B> {
    fn clone(&self) -> Self {
        Self {
            continuer: self.continuer.clone(),
            aggregator: self.aggregator.clone(),
            bus: self.bus.clone(),
        }
    }
}

impl<A: Clone + 'static, B: 'static> ChainedFactory<A, B> {
    /// Returns the iterating task over `task`.
    pub fn over(&self, task: impl Task<A, B>) -> Chained<A, B> {
        Chained {
            cfg: self.clone(),
            task: Rc::new(task),
        }
    }
}

/// Task iterating `task` and folding its outputs; see [`chained`].
pub struct Chained<A, B> {
    cfg: ChainedFactory<A, B>,
    task: TaskRef<A, B>,
}

impl<A: Clone + 'static, B: 'static> Task<A, A> for Chained<A, B> {
    fn name(&self) -> &str {
        "chained"
    }

    fn run(&self, ctx: CancellationToken, input: A, done: Callback<A>) {
        let done = done.guarded(&ctx);
        let rounds = Rc::new(Rounds {
            cfg: self.cfg.clone(),
            task: self.task.clone(),
            acc: RefCell::new(None),
            act: Activation::new("chained", ctx, self.cfg.bus.clone(), done),
        });
        rounds.pump(input);
    }
}

/// State of one `Chained` activation.
struct Rounds<A, B> {
    cfg: ChainedFactory<A, B>,
    task: TaskRef<A, B>,
    /// Accumulator the live round was started with.
    acc: RefCell<Option<A>>,
    act: Activation<A, A>,
}

impl<A: Clone + 'static, B: 'static> Rounds<A, B> {
    fn pump(self: &Rc<Self>, acc: A) {
        if !self.act.enqueue(acc) {
            return;
        }
        while let Some((round, acc)) = self.act.next_round() {
            *self.acc.borrow_mut() = Some(acc.clone());
            let this = Rc::clone(self);
            self.task
                .run(round, acc, Callback::new(move |o| this.on_round(o)));
        }
        self.act.release();
    }

    fn on_round(self: &Rc<Self>, outcome: Outcome<B>) {
        if self.act.suppressed() {
            return;
        }
        let Some(acc) = self.acc.borrow_mut().take() else {
            return;
        };
        match outcome {
            Err(err) => self.act.fail(err),
            Ok(out) => {
                self.act.round_succeeded();
                let next = (self.cfg.aggregator)(&acc, out);
                if (self.cfg.continuer)(&next) {
                    self.pump(next);
                } else {
                    self.act.succeed(next);
                }
            }
        }
    }
}
