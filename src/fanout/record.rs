//! # Record fan-out: many tasks, one key each.
//!
//! The task stored under key `k` receives the input's value under `k`. Keys
//! the input lacks report [`EmptyRecord::empty_record`] and their task is
//! never run; input keys without a task are ignored. All members are
//! submitted to the engine's `parallel_object` together.

use std::collections::BTreeMap;
use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use super::applied::Submit;
use super::placeholder::{EmptyRecord, placeholder};
use super::preload::preloaded;
use crate::config::Options;
use crate::engine::Engine;
use crate::{Callback, Task, TaskExt, TaskRef};

/// Task distributing a map input over keyed tasks; see [`record`].
pub struct Record<K, I, O> {
    tasks: BTreeMap<K, TaskRef<I, O>>,
    submit: Submit<BTreeMap<K, TaskRef<(), O>>, BTreeMap<K, O>>,
}

/// Returns a task feeding the input's value under each key to the task
/// stored under that key.
pub fn record<E, K, I, O>(
    engine: E,
    opts: Options,
    tasks: BTreeMap<K, TaskRef<I, O>>,
) -> Record<K, I, O>
where
    E: Engine + 'static,
    K: Ord + Clone + 'static,
    I: Clone + 'static,
    O: EmptyRecord + 'static,
{
    Record {
        tasks,
        submit: Rc::new(move |members: BTreeMap<K, TaskRef<(), O>>| {
            engine.parallel_object(opts, members)
        }),
    }
}

impl<K, I, O> Task<BTreeMap<K, I>, BTreeMap<K, O>> for Record<K, I, O>
where
    K: Ord + Clone + 'static,
    I: Clone + 'static,
    O: EmptyRecord + 'static,
{
    fn name(&self) -> &str {
        "record"
    }

    fn run(&self, ctx: CancellationToken, mut inputs: BTreeMap<K, I>, done: Callback<BTreeMap<K, O>>) {
        let members: BTreeMap<K, TaskRef<(), O>> = self
            .tasks
            .iter()
            .map(|(key, task)| {
                let member: TaskRef<(), O> = match inputs.remove(key) {
                    Some(input) => preloaded(task.clone(), input).into_ref(),
                    None => placeholder::<O>().into_ref(),
                };
                (key.clone(), member)
            })
            .collect();
        (self.submit)(members).run(ctx, (), done)
    }
}
