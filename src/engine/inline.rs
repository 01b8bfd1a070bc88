//! # In-process composition engine.
//!
//! [`InlineEngine`] runs every primitive on the caller's event loop. Members
//! of an aggregate each get a child token of the aggregate's activation;
//! settling the aggregate cancels the members still running.
//!
//! `time_limit` and `throttle` are not enforced: every member starts at once
//! and nothing is timed. When either is set, the engine publishes
//! [`EventKind::OptionsNotHonored`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use super::Engine;
use crate::combinators::activation::Activation;
use crate::config::Options;
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind, emit};
use crate::{Callback, Outcome, Task, TaskRef};

/// Engine running every primitive in-process.
///
/// ```
/// use requestors::{constant, unary, Callback, Engine, InlineEngine, Options, TaskExt, TaskRef};
///
/// let engine = InlineEngine::new();
/// let tasks: Vec<TaskRef<u32, u32>> = vec![
///     unary(|n: u32| Ok::<_, String>(n + 1)).into_ref(),
///     constant(7u32).into_ref(),
/// ];
/// engine
///     .parallel(Options::default(), tasks)
///     .start(1, Callback::new(|o| assert_eq!(o, Ok(vec![2, 7]))));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InlineEngine {
    bus: Option<Bus>,
}

impl InlineEngine {
    /// Creates an engine that publishes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes delegation and iteration events to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    fn delegated(&self, primitive: &'static str, opts: &Options, count: usize) {
        emit(self.bus.as_ref(), || {
            Event::new(EventKind::Delegated)
                .with_task(primitive)
                .with_count(count as u64)
        });
        if opts.is_constrained() {
            emit(self.bus.as_ref(), || {
                Event::new(EventKind::OptionsNotHonored)
                    .with_task(primitive)
                    .with_reason(ignored(opts))
            });
        }
    }
}

/// Renders the options this engine leaves unenforced.
fn ignored(opts: &Options) -> String {
    let mut parts = Vec::new();
    if let Some(limit) = opts.time_limit() {
        parts.push(format!("time_limit={limit:?}"));
    }
    if let Some(n) = opts.throttle_limit() {
        parts.push(format!("throttle={n}"));
    }
    parts.join(" ")
}

impl Engine for InlineEngine {
    fn race<I, O>(&self, opts: Options, tasks: Vec<TaskRef<I, O>>) -> TaskRef<I, O>
    where
        I: Clone + 'static,
        O: 'static,
    {
        self.delegated("race", &opts, tasks.len());
        Rc::new(Race { tasks })
    }

    fn parallel<I, O>(&self, opts: Options, tasks: Vec<TaskRef<I, O>>) -> TaskRef<I, Vec<O>>
    where
        I: Clone + 'static,
        O: 'static,
    {
        self.delegated("parallel", &opts, tasks.len());
        Rc::new(Parallel { tasks })
    }

    fn fallback<I, O>(&self, opts: Options, tasks: Vec<TaskRef<I, O>>) -> TaskRef<I, O>
    where
        I: Clone + 'static,
        O: 'static,
    {
        self.delegated("fallback", &opts, tasks.len());
        Rc::new(Fallback {
            tasks: Rc::new(tasks),
            bus: self.bus.clone(),
        })
    }

    fn parallel_object<K, I, O>(
        &self,
        opts: Options,
        tasks: BTreeMap<K, TaskRef<I, O>>,
    ) -> TaskRef<I, BTreeMap<K, O>>
    where
        K: Ord + Clone + 'static,
        I: Clone + 'static,
        O: 'static,
    {
        self.delegated("parallel_object", &opts, tasks.len());
        let (keys, tasks): (Vec<K>, Vec<TaskRef<I, O>>) = tasks.into_iter().unzip();
        Rc::new(ParallelObject {
            keys,
            inner: Parallel { tasks },
        })
    }

    fn sequence<T>(&self, opts: Options, tasks: Vec<TaskRef<T, T>>) -> TaskRef<T, T>
    where
        T: 'static,
    {
        self.delegated("sequence", &opts, tasks.len());
        Rc::new(Sequence {
            tasks: Rc::new(tasks),
            bus: self.bus.clone(),
        })
    }
}

/// Settlement shared by the members of one concurrent aggregate.
struct Join<O> {
    done: RefCell<Option<Callback<O>>>,
    members: Vec<CancellationToken>,
    remaining: Cell<usize>,
}

impl<O: 'static> Join<O> {
    fn new(ctx: &CancellationToken, count: usize, done: Callback<O>) -> Rc<Self> {
        Rc::new(Self {
            done: RefCell::new(Some(done)),
            members: (0..count).map(|_| ctx.child_token()).collect(),
            remaining: Cell::new(count),
        })
    }

    fn is_settled(&self) -> bool {
        self.done.borrow().is_none()
    }

    /// Counts one member as finished; `true` for the last one.
    fn countdown(&self) -> bool {
        let left = self.remaining.get().saturating_sub(1);
        self.remaining.set(left);
        left == 0
    }

    /// Delivers the aggregate outcome once and cancels the members.
    fn settle(&self, outcome: Outcome<O>) {
        let done = self.done.borrow_mut().take();
        if let Some(done) = done {
            for member in &self.members {
                member.cancel();
            }
            done.call(outcome);
        }
    }
}

struct Race<I, O> {
    tasks: Vec<TaskRef<I, O>>,
}

impl<I: Clone + 'static, O: 'static> Task<I, O> for Race<I, O> {
    fn name(&self) -> &str {
        "race"
    }

    fn run(&self, ctx: CancellationToken, input: I, done: Callback<O>) {
        let done = done.guarded(&ctx);
        if self.tasks.is_empty() {
            done.fail(TaskError::NoTasks);
            return;
        }

        let join = Join::new(&ctx, self.tasks.len(), done);
        for (task, member) in self.tasks.iter().zip(join.members.clone()) {
            if join.is_settled() {
                break;
            }
            let j = join.clone();
            task.run(
                member,
                input.clone(),
                Callback::new(move |o| match o {
                    Ok(value) => j.settle(Ok(value)),
                    Err(err) => {
                        if j.countdown() {
                            j.settle(Err(err));
                        }
                    }
                }),
            );
        }
    }
}

struct Parallel<I, O> {
    tasks: Vec<TaskRef<I, O>>,
}

impl<I: Clone + 'static, O: 'static> Task<I, Vec<O>> for Parallel<I, O> {
    fn name(&self) -> &str {
        "parallel"
    }

    fn run(&self, ctx: CancellationToken, input: I, done: Callback<Vec<O>>) {
        let done = done.guarded(&ctx);
        if self.tasks.is_empty() {
            done.succeed(Vec::new());
            return;
        }

        let join = Join::new(&ctx, self.tasks.len(), done);
        let slots: Rc<RefCell<Vec<Option<O>>>> =
            Rc::new(RefCell::new((0..self.tasks.len()).map(|_| None).collect()));

        for (idx, (task, member)) in self.tasks.iter().zip(join.members.clone()).enumerate() {
            if join.is_settled() {
                break;
            }
            let (j, s) = (join.clone(), slots.clone());
            task.run(
                member,
                input.clone(),
                Callback::new(move |o| match o {
                    Ok(value) => {
                        s.borrow_mut()[idx] = Some(value);
                        if j.countdown() {
                            let outputs: Vec<O> = s.borrow_mut().drain(..).flatten().collect();
                            j.settle(Ok(outputs));
                        }
                    }
                    Err(err) => j.settle(Err(err)),
                }),
            );
        }
    }
}

struct ParallelObject<K, I, O> {
    keys: Vec<K>,
    inner: Parallel<I, O>,
}

impl<K, I, O> Task<I, BTreeMap<K, O>> for ParallelObject<K, I, O>
where
    K: Ord + Clone + 'static,
    I: Clone + 'static,
    O: 'static,
{
    fn name(&self) -> &str {
        "parallel_object"
    }

    fn run(&self, ctx: CancellationToken, input: I, done: Callback<BTreeMap<K, O>>) {
        let keys = self.keys.clone();
        let done = done.map_input(move |outputs: Vec<O>| keys.into_iter().zip(outputs).collect());
        self.inner.run(ctx, input, done);
    }
}

struct Fallback<I, O> {
    tasks: Rc<Vec<TaskRef<I, O>>>,
    bus: Option<Bus>,
}

impl<I: Clone + 'static, O: 'static> Task<I, O> for Fallback<I, O> {
    fn name(&self) -> &str {
        "fallback"
    }

    fn run(&self, ctx: CancellationToken, input: I, done: Callback<O>) {
        let done = done.guarded(&ctx);
        if self.tasks.is_empty() {
            done.fail(TaskError::NoTasks);
            return;
        }
        let attempts = Rc::new(Attempts {
            tasks: self.tasks.clone(),
            input,
            act: Activation::new("fallback", ctx, self.bus.clone(), done),
        });
        attempts.pump(0);
    }
}

/// State of one `fallback` activation; rounds carry the member index.
struct Attempts<I, O> {
    tasks: Rc<Vec<TaskRef<I, O>>>,
    input: I,
    act: Activation<usize, O>,
}

impl<I: Clone + 'static, O: 'static> Attempts<I, O> {
    fn pump(self: &Rc<Self>, idx: usize) {
        if !self.act.enqueue(idx) {
            return;
        }
        while let Some((member, idx)) = self.act.next_round() {
            let this = Rc::clone(self);
            self.tasks[idx].run(
                member,
                self.input.clone(),
                Callback::new(move |o| this.on_attempt(idx, o)),
            );
        }
        self.act.release();
    }

    fn on_attempt(self: &Rc<Self>, idx: usize, outcome: Outcome<O>) {
        if self.act.suppressed() {
            return;
        }
        match outcome {
            Ok(value) => self.act.succeed(value),
            Err(_) if idx + 1 < self.tasks.len() => self.pump(idx + 1),
            Err(err) => self.act.fail(err),
        }
    }
}

struct Sequence<T> {
    tasks: Rc<Vec<TaskRef<T, T>>>,
    bus: Option<Bus>,
}

impl<T: 'static> Task<T, T> for Sequence<T> {
    fn name(&self) -> &str {
        "sequence"
    }

    fn run(&self, ctx: CancellationToken, input: T, done: Callback<T>) {
        let done = done.guarded(&ctx);
        if self.tasks.is_empty() {
            done.succeed(input);
            return;
        }
        let steps = Rc::new(Steps {
            tasks: self.tasks.clone(),
            act: Activation::new("sequence", ctx, self.bus.clone(), done),
        });
        steps.pump(input);
    }
}

/// State of one `sequence` activation; round `n` runs member `n - 1`.
struct Steps<T> {
    tasks: Rc<Vec<TaskRef<T, T>>>,
    act: Activation<T, T>,
}

impl<T: 'static> Steps<T> {
    fn pump(self: &Rc<Self>, value: T) {
        if !self.act.enqueue(value) {
            return;
        }
        while let Some((member, value)) = self.act.next_round() {
            let idx = self.act.round() as usize - 1;
            let this = Rc::clone(self);
            self.tasks[idx].run(member, value, Callback::new(move |o| this.on_step(o)));
        }
        self.act.release();
    }

    fn on_step(self: &Rc<Self>, outcome: Outcome<T>) {
        if self.act.suppressed() {
            return;
        }
        match outcome {
            Err(err) => self.act.fail(err),
            Ok(value) => {
                self.act.round_succeeded();
                if self.act.round() as usize >= self.tasks.len() {
                    self.act.succeed(value);
                } else {
                    self.pump(value);
                }
            }
        }
    }
}
