//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(CancellationToken, I, Callback<O>)`.
//! Each activation calls the closure afresh; shared state must be captured
//! explicitly (`Rc<Cell<..>>`, `Rc<RefCell<..>>`).
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use requestors::{Callback, TaskFn, TaskRef, Task};
//!
//! let inc: TaskRef<u32, u32> = TaskFn::rc("inc", |_ctx: CancellationToken, n: u32, done: Callback<u32>| {
//!     done.succeed(n + 1)
//! });
//!
//! assert_eq!(inc.name(), "inc");
//! ```

use std::borrow::Cow;
use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use crate::tasks::callback::Callback;
use crate::tasks::task::Task;

/// Function-backed task implementation.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::rc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn rc(name: impl Into<Cow<'static, str>>, f: F) -> Rc<Self> {
        Rc::new(Self::new(name, f))
    }
}

impl<I, O, F> Task<I, O> for TaskFn<F>
where
    F: Fn(CancellationToken, I, Callback<O>) + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: CancellationToken, input: I, done: Callback<O>) {
        (self.f)(ctx, input, done)
    }
}
