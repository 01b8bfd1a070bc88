//! # Logged sequencing.
//!
//! Tasks returning a [`Logged`] pair are chained so that each value feeds the
//! next task and the logs pile up through [`Monoid::concat`]:
//!
//! ```text
//! input ─► {log: empty, value: input}
//!        ─► t1(value) = {l1, v1} ─► {empty·l1, v1}
//!        ─► t2(v1)    = {l2, v2} ─► {empty·l1·l2, v2}
//! ```
//!
//! The chain runs through the engine's `sequence`.

use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use crate::config::Options;
use crate::engine::Engine;
use crate::{Callback, Outcome, Task, TaskRef};

/// Associative `concat` with identity `empty`.
pub trait Monoid {
    /// The identity element.
    fn empty() -> Self;

    /// Appends `other` to `self`.
    fn concat(self, other: Self) -> Self;
}

impl Monoid for String {
    fn empty() -> Self {
        String::new()
    }

    fn concat(mut self, other: Self) -> Self {
        self.push_str(&other);
        self
    }
}

impl<T> Monoid for Vec<T> {
    fn empty() -> Self {
        Vec::new()
    }

    fn concat(mut self, mut other: Self) -> Self {
        self.append(&mut other);
        self
    }
}

/// A value paired with the log produced while computing it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Logged<L, T> {
    /// Accumulated log.
    pub log: L,
    /// Current value.
    pub value: T,
}

impl<L, T> Logged<L, T> {
    /// Pairs `value` with `log`.
    pub fn new(log: L, value: T) -> Self {
        Self { log, value }
    }
}

impl<L: Monoid, T> Logged<L, T> {
    /// `value` with an empty log.
    pub fn pure(value: T) -> Self {
        Self::new(L::empty(), value)
    }
}

/// Task threading values through logged tasks; see [`kleisli_sequence`].
pub struct Kleisli<L, T> {
    chain: TaskRef<Logged<L, T>, Logged<L, T>>,
}

/// Sequences `tasks`, concatenating their logs in order.
///
/// ```
/// use requestors::{kleisli_sequence, unary, Callback, InlineEngine, Logged, Options, TaskExt, TaskRef};
///
/// let step = |label: &'static str| -> TaskRef<u32, Logged<String, u32>> {
///     unary(move |n: u32| Ok::<_, String>(Logged::new(format!("{label};"), n * 2))).into_ref()
/// };
/// kleisli_sequence(&InlineEngine::new(), Options::default(), vec![step("a"), step("b")])
///     .start(3, Callback::new(|o| assert_eq!(o, Ok(Logged::new("a;b;".to_string(), 12)))));
/// ```
pub fn kleisli_sequence<E, L, T>(
    engine: &E,
    opts: Options,
    tasks: Vec<TaskRef<T, Logged<L, T>>>,
) -> Kleisli<L, T>
where
    E: Engine,
    L: Monoid + 'static,
    T: 'static,
{
    let lifted: Vec<TaskRef<Logged<L, T>, Logged<L, T>>> = tasks
        .into_iter()
        .map(|task| -> TaskRef<Logged<L, T>, Logged<L, T>> { Rc::new(Lifted { task }) })
        .collect();
    Kleisli {
        chain: engine.sequence(opts, lifted),
    }
}

impl<L: Monoid + 'static, T: 'static> Task<T, Logged<L, T>> for Kleisli<L, T> {
    fn name(&self) -> &str {
        "kleisli_sequence"
    }

    fn run(&self, ctx: CancellationToken, input: T, done: Callback<Logged<L, T>>) {
        self.chain.run(ctx, Logged::pure(input), done)
    }
}

/// Runs a logged task on the carried value and prepends the carried log.
struct Lifted<L, T> {
    task: TaskRef<T, Logged<L, T>>,
}

impl<L: Monoid + 'static, T: 'static> Task<Logged<L, T>, Logged<L, T>> for Lifted<L, T> {
    fn name(&self) -> &str {
        self.task.name()
    }

    fn run(&self, ctx: CancellationToken, input: Logged<L, T>, done: Callback<Logged<L, T>>) {
        let Logged { log, value } = input;
        self.task.run(
            ctx,
            value,
            Callback::new(move |o: Outcome<Logged<L, T>>| {
                done.call(o.map(|step| Logged::new(log.concat(step.log), step.value)))
            }),
        )
    }
}
