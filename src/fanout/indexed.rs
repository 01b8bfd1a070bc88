//! # Indexed fan-out: many tasks, one position each.
//!
//! Task `n` receives element `n` of the input. Positions the input does not
//! reach report [`EmptyRecord::empty_record`] and their task is never run.
//! Elements past the last task are ignored. All members are submitted to the
//! engine's `parallel` together.

use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use super::applied::Submit;
use super::placeholder::{EmptyRecord, placeholder};
use super::preload::preloaded;
use crate::config::Options;
use crate::engine::Engine;
use crate::{Callback, Task, TaskExt, TaskRef};

/// Task distributing a `Vec` input over positional tasks; see [`indexed`].
pub struct Indexed<I, O> {
    tasks: Vec<TaskRef<I, O>>,
    submit: Submit<Vec<TaskRef<(), O>>, Vec<O>>,
}

/// Returns a task feeding element `n` of its input to `tasks[n]`.
///
/// ```
/// use serde_json::{json, Value};
/// use requestors::{indexed, unary, Callback, InlineEngine, Options, TaskExt, TaskRef};
///
/// let tasks: Vec<TaskRef<Value, Value>> = vec![
///     unary(|v: Value| Ok::<_, String>(json!(v.to_string()))).into_ref(),
///     unary(|v: Value| Ok::<_, String>(json!([v]))).into_ref(),
/// ];
/// indexed(InlineEngine::new(), Options::default(), tasks)
///     .start(vec![json!(1)], Callback::new(|o| assert_eq!(o, Ok(vec![json!("1"), json!({})]))));
/// ```
pub fn indexed<E, I, O>(engine: E, opts: Options, tasks: Vec<TaskRef<I, O>>) -> Indexed<I, O>
where
    E: Engine + 'static,
    I: Clone + 'static,
    O: EmptyRecord + 'static,
{
    Indexed {
        tasks,
        submit: Rc::new(move |members: Vec<TaskRef<(), O>>| engine.parallel(opts, members)),
    }
}

impl<I, O> Task<Vec<I>, Vec<O>> for Indexed<I, O>
where
    I: Clone + 'static,
    O: EmptyRecord + 'static,
{
    fn name(&self) -> &str {
        "indexed"
    }

    fn run(&self, ctx: CancellationToken, inputs: Vec<I>, done: Callback<Vec<O>>) {
        let mut inputs = inputs.into_iter();
        let members: Vec<TaskRef<(), O>> = self
            .tasks
            .iter()
            .map(|task| -> TaskRef<(), O> {
                match inputs.next() {
                    Some(input) => preloaded(task.clone(), input).into_ref(),
                    None => placeholder::<O>().into_ref(),
                }
            })
            .collect();
        (self.submit)(members).run(ctx, (), done)
    }
}
