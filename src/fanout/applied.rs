//! # Applied fan-out: one task, many inputs.
//!
//! ```text
//! applied_parallel(engine, opts, task).run([a, b, c])
//!   ─► engine.parallel(opts, [task<-a, task<-b, task<-c]).run(())
//! ```
//!
//! Each input is bound to its own [`Preloaded`](super::preload::Preloaded)
//! copy of the task; the engine decides how the copies run and settle.

use std::collections::BTreeMap;
use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use super::preload::preloaded;
use crate::config::Options;
use crate::engine::Engine;
use crate::{Callback, Task, TaskExt, TaskRef};

/// Hands prepared members to one engine primitive.
pub(crate) type Submit<M, R> = Rc<dyn Fn(M) -> TaskRef<(), R>>;

/// Task running one task over every element of a `Vec` input.
pub struct Applied<I, O, R> {
    name: &'static str,
    task: TaskRef<I, O>,
    submit: Submit<Vec<TaskRef<(), O>>, R>,
}

impl<I, O, R> Task<Vec<I>, R> for Applied<I, O, R>
where
    I: Clone + 'static,
    O: 'static,
    R: 'static,
{
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, ctx: CancellationToken, inputs: Vec<I>, done: Callback<R>) {
        let members: Vec<TaskRef<(), O>> = inputs
            .into_iter()
            .map(|input| preloaded(self.task.clone(), input).into_ref())
            .collect();
        (self.submit)(members).run(ctx, (), done)
    }
}

/// Runs `task` over every input and reports the first success.
///
/// ```
/// use requestors::{applied_race, unary, Callback, InlineEngine, Options, TaskExt};
///
/// let positive = unary(|n: i32| if n > 0 { Ok(n) } else { Err("not positive") });
/// applied_race(InlineEngine::new(), Options::default(), positive)
///     .start(vec![-1, 4, 9], Callback::new(|o| assert_eq!(o, Ok(4))));
/// ```
pub fn applied_race<E, I, O>(engine: E, opts: Options, task: impl Task<I, O>) -> Applied<I, O, O>
where
    E: Engine + 'static,
    I: Clone + 'static,
    O: 'static,
{
    Applied {
        name: "applied_race",
        task: task.into_ref(),
        submit: Rc::new(move |members: Vec<TaskRef<(), O>>| engine.race(opts, members)),
    }
}

/// Runs `task` over every input and reports all outputs, in input order.
pub fn applied_parallel<E, I, O>(
    engine: E,
    opts: Options,
    task: impl Task<I, O>,
) -> Applied<I, O, Vec<O>>
where
    E: Engine + 'static,
    I: Clone + 'static,
    O: 'static,
{
    Applied {
        name: "applied_parallel",
        task: task.into_ref(),
        submit: Rc::new(move |members: Vec<TaskRef<(), O>>| engine.parallel(opts, members)),
    }
}

/// Runs `task` over the inputs one at a time until one succeeds.
pub fn applied_fallback<E, I, O>(
    engine: E,
    opts: Options,
    task: impl Task<I, O>,
) -> Applied<I, O, O>
where
    E: Engine + 'static,
    I: Clone + 'static,
    O: 'static,
{
    Applied {
        name: "applied_fallback",
        task: task.into_ref(),
        submit: Rc::new(move |members: Vec<TaskRef<(), O>>| engine.fallback(opts, members)),
    }
}

/// Task running one task over every value of a map input.
pub struct AppliedObject<K, I, O> {
    task: TaskRef<I, O>,
    submit: Submit<BTreeMap<K, TaskRef<(), O>>, BTreeMap<K, O>>,
}

impl<K, I, O> Task<BTreeMap<K, I>, BTreeMap<K, O>> for AppliedObject<K, I, O>
where
    K: Ord + 'static,
    I: Clone + 'static,
    O: 'static,
{
    fn name(&self) -> &str {
        "applied_parallel_object"
    }

    fn run(&self, ctx: CancellationToken, inputs: BTreeMap<K, I>, done: Callback<BTreeMap<K, O>>) {
        let members: BTreeMap<K, TaskRef<(), O>> = inputs
            .into_iter()
            .map(|(key, input)| (key, preloaded(self.task.clone(), input).into_ref()))
            .collect();
        (self.submit)(members).run(ctx, (), done)
    }
}

/// Runs `task` over every value and reports the outputs under the same keys.
pub fn applied_parallel_object<E, K, I, O>(
    engine: E,
    opts: Options,
    task: impl Task<I, O>,
) -> AppliedObject<K, I, O>
where
    E: Engine + 'static,
    K: Ord + Clone + 'static,
    I: Clone + 'static,
    O: 'static,
{
    AppliedObject {
        task: task.into_ref(),
        submit: Rc::new(move |members: BTreeMap<K, TaskRef<(), O>>| {
            engine.parallel_object(opts, members)
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::TaskError;
    use crate::testing::Probe;
    use crate::{InlineEngine, TaskFn, unary};

    fn double() -> impl Task<u32, u32> {
        unary(|n: u32| Ok::<_, String>(n * 2))
    }

    #[test]
    fn parallel_maps_every_input_in_order() {
        let probe = Probe::new();
        applied_parallel(InlineEngine::new(), Options::default(), double())
            .start(vec![1, 2, 3], probe.callback());
        assert_eq!(probe.outcomes(), vec![Ok(vec![2, 4, 6])]);
    }

    #[test]
    fn fallback_tries_inputs_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let even_only = TaskFn::rc("even", move |_ctx: CancellationToken, n: u32, done: Callback<u32>| {
            s.borrow_mut().push(n);
            if n % 2 == 0 {
                done.succeed(n);
            } else {
                done.fail(TaskError::fail(format!("{n} is odd")));
            }
        });

        let probe = Probe::new();
        applied_fallback(InlineEngine::new(), Options::default(), even_only.clone())
            .start(vec![1, 3, 4, 6], probe.callback());
        assert_eq!(probe.outcomes(), vec![Ok(4)]);
        assert_eq!(*seen.borrow(), vec![1, 3, 4]);

        let probe = Probe::new();
        applied_fallback(InlineEngine::new(), Options::default(), even_only)
            .start(vec![1, 3], probe.callback());
        assert_eq!(probe.outcomes(), vec![Err(TaskError::fail("3 is odd"))]);
    }

    #[test]
    fn race_over_no_inputs_fails() {
        let probe = Probe::new();
        applied_race(InlineEngine::new(), Options::default(), double())
            .start(vec![], probe.callback());
        assert_eq!(probe.outcomes(), vec![Err(TaskError::NoTasks)]);
    }

    #[test]
    fn parallel_object_keeps_keys() {
        let inputs: BTreeMap<String, u32> =
            [("x".to_string(), 5), ("y".to_string(), 7)].into_iter().collect();
        let probe = Probe::new();
        applied_parallel_object(InlineEngine::new(), Options::default(), double())
            .start(inputs, probe.callback());

        let expected: BTreeMap<String, u32> =
            [("x".to_string(), 10), ("y".to_string(), 14)].into_iter().collect();
        assert_eq!(probe.outcomes(), vec![Ok(expected)]);
    }
}
