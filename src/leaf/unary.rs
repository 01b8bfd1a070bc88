//! Unary task: lifts a synchronous, fallible function.
//!
//! `Err(e)` becomes a failure carrying `e.to_string()`. A panic inside the
//! function is caught and reported as [`TaskError::Panicked`] instead of
//! unwinding through the caller's event loop.

use std::fmt::Display;
use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::subscribers::panic_info;
use crate::{Callback, Task};

/// Task applying `f` to its input.
pub struct Unary<F, E> {
    f: F,
    _err: PhantomData<fn() -> E>,
}

/// Returns a task reporting `f(input)`.
///
/// ```
/// use requestors::{unary, Callback, TaskError, TaskExt};
///
/// let parse = unary(|s: &'static str| s.parse::<u32>());
/// parse.start("12", Callback::new(|o| assert_eq!(o, Ok(12))));
/// parse.start("x", Callback::new(|o: Result<u32, TaskError>| {
///     assert_eq!(o.unwrap_err().to_string(), "invalid digit found in string");
/// }));
/// ```
pub fn unary<I, O, E, F>(f: F) -> Unary<F, E>
where
    F: Fn(I) -> Result<O, E> + 'static,
    E: Display,
{
    Unary {
        f,
        _err: PhantomData,
    }
}

impl<I, O, E, F> Task<I, O> for Unary<F, E>
where
    I: 'static,
    O: 'static,
    E: Display + 'static,
    F: Fn(I) -> Result<O, E> + 'static,
{
    fn name(&self) -> &str {
        "unary"
    }

    fn run(&self, ctx: CancellationToken, input: I, done: Callback<O>) {
        let done = done.guarded(&ctx);
        match catch_unwind(AssertUnwindSafe(|| (self.f)(input))) {
            Ok(Ok(value)) => done.succeed(value),
            Ok(Err(err)) => done.fail(TaskError::fail(err.to_string())),
            Err(panic_err) => done.fail(TaskError::Panicked {
                info: panic_info(&*panic_err),
            }),
        }
    }
}
