//! Constant task: ignores its input and succeeds with a fixed value.
//!
//! Useful for inserting a value into a sequence of tasks.

use tokio_util::sync::CancellationToken;

use crate::{Callback, Task};

/// Task that always succeeds with a clone of `value`.
#[derive(Clone, Debug)]
pub struct Constant<T> {
    value: T,
}

/// Returns a task reporting `Ok(value)` synchronously for any input.
///
/// ```
/// use requestors::{constant, Callback, TaskExt};
///
/// constant(7).start("ignored", Callback::new(|o| assert_eq!(o, Ok(7))));
/// ```
pub fn constant<T: Clone + 'static>(value: T) -> Constant<T> {
    Constant { value }
}

impl<I: 'static, T: Clone + 'static> Task<I, T> for Constant<T> {
    fn name(&self) -> &str {
        "constant"
    }

    fn run(&self, ctx: CancellationToken, _input: I, done: Callback<T>) {
        done.guarded(&ctx).succeed(self.value.clone());
    }
}
