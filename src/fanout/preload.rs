//! Preloaded task: binds an input to a task.

use tokio_util::sync::CancellationToken;

use crate::{Callback, Task, TaskRef};

/// Task that ignores its own input and runs `task` with a stored one.
pub struct Preloaded<I, O> {
    task: TaskRef<I, O>,
    input: I,
}

/// Binds `input` to `task`; every activation runs `task` with a clone of it.
pub fn preloaded<I, O>(task: TaskRef<I, O>, input: I) -> Preloaded<I, O> {
    Preloaded { task, input }
}

impl<X, I, O> Task<X, O> for Preloaded<I, O>
where
    I: Clone + 'static,
    O: 'static,
{
    fn name(&self) -> &str {
        self.task.name()
    }

    fn run(&self, ctx: CancellationToken, _ignored: X, done: Callback<O>) {
        self.task.run(ctx, self.input.clone(), done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Probe;
    use crate::{TaskExt, unary};

    #[test]
    fn runs_with_the_bound_input_every_time() {
        let probe = Probe::new();
        let square = preloaded(unary(|n: u32| Ok::<_, String>(n * n)).into_ref(), 6);
        square.start((), probe.callback());
        square.start((), probe.callback());
        assert_eq!(probe.outcomes(), vec![Ok(36), Ok(36)]);
    }
}
