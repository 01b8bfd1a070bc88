//! # Task abstraction.
//!
//! A [`Task`] is invoked with a [`CancellationToken`], an input value and a
//! [`Callback`]. It begins its work, returns immediately, and reports its
//! outcome through the callback at most once, possibly synchronously from
//! inside `run`.
//!
//! The token is the activation's cancellation handle. Once it is cancelled
//! the task must not report an outcome and should release whatever it holds
//! (timers, spawned futures, child activations). Combinators give every child
//! activation `ctx.child_token()`, so cancelling an outer activation reaches
//! whichever inner activation is live.
//!
//! Tasks are single-threaded: they are shared as [`TaskRef`] (`Rc<dyn Task>`)
//! and may hold `Rc`/`RefCell` state.

use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use crate::tasks::callback::Callback;

/// # Callback-driven, cancelable unit of work.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use requestors::{Callback, Task, TaskExt};
///
/// struct Double;
///
/// impl Task<u32, u32> for Double {
///     fn name(&self) -> &str { "double" }
///
///     fn run(&self, _ctx: CancellationToken, input: u32, done: Callback<u32>) {
///         done.succeed(input * 2);
///     }
/// }
///
/// let handle = Double.start(21, Callback::new(|o| assert_eq!(o, Ok(42))));
/// handle.cancel(); // settled already: no-op
/// ```
pub trait Task<I, O>: 'static {
    /// Returns a stable, human-readable task name used in events.
    fn name(&self) -> &str {
        "task"
    }

    /// Starts one activation.
    ///
    /// Implementations report through `done` at most once and never after
    /// `ctx` is cancelled.
    fn run(&self, ctx: CancellationToken, input: I, done: Callback<O>);
}

/// Shared handle to a task.
pub type TaskRef<I, O> = Rc<dyn Task<I, O>>;

impl<I, O, T> Task<I, O> for Rc<T>
where
    T: Task<I, O> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&self, ctx: CancellationToken, input: I, done: Callback<O>) {
        (**self).run(ctx, input, done)
    }
}

/// Convenience entry points for invoking a task.
pub trait TaskExt<I, O>: Task<I, O> {
    /// Runs the task under a fresh token and returns that token as the
    /// activation's cancellation handle.
    ///
    /// The callback is guarded: cancelling the handle suppresses any outcome
    /// not yet delivered. Cancelling twice, or after settlement, is a no-op.
    fn start(&self, input: I, done: Callback<O>) -> CancellationToken
    where
        O: 'static,
    {
        let ctx = CancellationToken::new();
        self.run(ctx.clone(), input, done.guarded(&ctx));
        ctx
    }

    /// Boxes the task into a shared [`TaskRef`].
    fn into_ref(self) -> TaskRef<I, O>
    where
        Self: Sized,
    {
        Rc::new(self)
    }
}

impl<I, O, T: Task<I, O> + ?Sized> TaskExt<I, O> for T {}
