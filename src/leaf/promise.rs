//! # Future-backed tasks.
//!
//! [`promise`] lifts a future factory: every activation calls the factory and
//! drives the resulting future on the current `tokio::task::LocalSet`.
//! [`promise_once`] lifts a single, already-created future; it can be
//! activated only once.
//!
//! ## Rules
//! - `Ok(v)` → success, `Err(e)` → failure carrying `e.to_string()`.
//! - A panic while polling the future → [`TaskError::Panicked`].
//! - Cancelling the activation drops the future at its next suspension point
//!   and suppresses the outcome.
//! - Started outside a tokio runtime → [`TaskError::NoRuntime`].
//! - Started inside a runtime but outside a `LocalSet` →
//!   [`TaskError::NoLocalSet`].

use std::cell::{Cell, RefCell};
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::{TaskError, TimerError};
use crate::subscribers::panic_info;
use crate::timers::spawn_local;
use crate::{Callback, Outcome, Task};

type Factory<T> = Box<dyn Fn() -> LocalBoxFuture<'static, Outcome<T>>>;

/// Task that runs a fresh future per activation.
pub struct Promise<T> {
    factory: Factory<T>,
}

/// Returns a task driving `factory()` to completion.
///
/// ```no_run
/// use requestors::{promise, Callback, TaskExt};
///
/// # async fn demo() {
/// let fetch = promise(|| async { Ok::<_, std::io::Error>(42u32) });
/// let local = tokio::task::LocalSet::new();
/// local
///     .run_until(async move {
///         fetch.start((), Callback::new(|o| assert_eq!(o, Ok(42))));
///     })
///     .await;
/// # }
/// ```
pub fn promise<T, E, F, Fut>(factory: F) -> Promise<T>
where
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
    E: Display,
    T: 'static,
{
    Promise {
        factory: Box::new(move || {
            factory()
                .map(|res| res.map_err(|e| TaskError::fail(e.to_string())))
                .boxed_local()
        }),
    }
}

impl<I: 'static, T: 'static> Task<I, T> for Promise<T> {
    fn name(&self) -> &str {
        "promise"
    }

    fn run(&self, ctx: CancellationToken, _input: I, done: Callback<T>) {
        drive(ctx, (self.factory)(), done);
    }
}

/// Task that runs one pre-built future; later activations fail.
pub struct PromiseOnce<T> {
    fut: RefCell<Option<LocalBoxFuture<'static, Outcome<T>>>>,
}

/// Returns a single-use task driving `fut`.
pub fn promise_once<T, E, Fut>(fut: Fut) -> PromiseOnce<T>
where
    Fut: Future<Output = Result<T, E>> + 'static,
    E: Display,
    T: 'static,
{
    PromiseOnce {
        fut: RefCell::new(Some(
            fut.map(|res| res.map_err(|e| TaskError::fail(e.to_string())))
                .boxed_local(),
        )),
    }
}

impl<I: 'static, T: 'static> Task<I, T> for PromiseOnce<T> {
    fn name(&self) -> &str {
        "promise_once"
    }

    fn run(&self, ctx: CancellationToken, _input: I, done: Callback<T>) {
        let fut = self.fut.borrow_mut().take();
        match fut {
            Some(fut) => drive(ctx, fut, done),
            None => done.guarded(&ctx).fail(TaskError::Consumed),
        }
    }
}

/// Spawns `fut` on the local set and reports its outcome unless `ctx` is cancelled first.
fn drive<T: 'static>(
    ctx: CancellationToken,
    fut: LocalBoxFuture<'static, Outcome<T>>,
    done: Callback<T>,
) {
    let slot = Rc::new(Cell::new(Some(done.guarded(&ctx))));
    let report = slot.clone();

    let spawned = spawn_local(async move {
        let res = tokio::select! {
            biased;
            _ = ctx.cancelled() => return,
            res = AssertUnwindSafe(fut).catch_unwind() => res,
        };
        let Some(done) = report.take() else { return };
        match res {
            Ok(outcome) => done.call(outcome),
            Err(panic_err) => done.fail(TaskError::Panicked {
                info: panic_info(&*panic_err),
            }),
        }
    });

    if let Err(err) = spawned {
        if let Some(done) = slot.take() {
            done.fail(match err {
                TimerError::NoRuntime => TaskError::NoRuntime,
                _ => TaskError::NoLocalSet,
            });
        }
    }
}
