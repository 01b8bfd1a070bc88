//! # Outcome callbacks.
//!
//! Every task reports through a [`Callback`], a boxed `FnOnce(Outcome<O>)`.
//! Being `FnOnce`, a callback can fire at most once; dropping it without
//! calling means "no outcome" (the activation was cancelled).
//!
//! Tools in this module:
//! - [`Callback::guarded`] drops an outcome that arrives after cancellation.
//! - [`functional_callback`] routes an outcome to separate failure/success handlers.
//! - [`legacy`] / [`split`] / [`from_legacy`] bridge to the two-argument
//!   `(value, reason)` calling convention, where an absent value means failure.

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Result of one task activation: `Ok(value)` or `Err(reason)`.
pub type Outcome<O> = Result<O, TaskError>;

/// Single-use outcome handler.
pub struct Callback<O> {
    f: Box<dyn FnOnce(Outcome<O>)>,
}

impl<O: 'static> Callback<O> {
    /// Wraps a closure.
    pub fn new(f: impl FnOnce(Outcome<O>) + 'static) -> Self {
        Self { f: Box::new(f) }
    }

    /// Delivers the outcome, consuming the callback.
    pub fn call(self, outcome: Outcome<O>) {
        (self.f)(outcome)
    }

    /// Delivers a success.
    pub fn succeed(self, value: O) {
        self.call(Ok(value))
    }

    /// Delivers a failure.
    pub fn fail(self, err: TaskError) {
        self.call(Err(err))
    }

    /// Returns a callback that does nothing once `ctx` is cancelled.
    pub fn guarded(self, ctx: &CancellationToken) -> Self {
        let ctx = ctx.clone();
        Callback::new(move |outcome| {
            if !ctx.is_cancelled() {
                self.call(outcome);
            }
        })
    }

    /// Returns a callback that transforms a success before delivering it.
    pub fn map_input<P: 'static>(self, f: impl FnOnce(P) -> O + 'static) -> Callback<P> {
        Callback::new(move |outcome: Outcome<P>| self.call(outcome.map(f)))
    }
}

impl<O> std::fmt::Debug for Callback<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Callback")
    }
}

/// First half of a routing callback; see [`functional_callback`].
pub struct FunctionalCallback<F> {
    on_fail: F,
}

/// Builds a callback from a failure handler and (via
/// [`FunctionalCallback::on_success`]) a success handler.
///
/// Exactly one of the two handlers fires per outcome: the failure handler
/// receives the reason text, the success handler the value.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use requestors::{functional_callback, TaskError};
///
/// let seen = Rc::new(RefCell::new(String::new()));
/// let (a, b) = (seen.clone(), seen.clone());
/// let cb = functional_callback(move |reason: String| *a.borrow_mut() = reason)
///     .on_success(move |v: u32| *b.borrow_mut() = v.to_string());
///
/// cb.fail(TaskError::fail("nope"));
/// assert_eq!(*seen.borrow(), "nope");
/// ```
pub fn functional_callback<F>(on_fail: F) -> FunctionalCallback<F>
where
    F: FnOnce(String) + 'static,
{
    FunctionalCallback { on_fail }
}

impl<F> FunctionalCallback<F>
where
    F: FnOnce(String) + 'static,
{
    /// Completes the routing callback.
    pub fn on_success<T: 'static>(self, on_success: impl FnOnce(T) + 'static) -> Callback<T> {
        let on_fail = self.on_fail;
        Callback::new(move |outcome| match outcome {
            Ok(value) => on_success(value),
            Err(err) => on_fail(err.reason()),
        })
    }
}

/// Adapts a two-argument `(value, reason)` handler.
///
/// Success arrives as `(Some(value), None)`, failure as `(None, Some(reason))`.
pub fn legacy<T: 'static>(f: impl FnOnce(Option<T>, Option<String>) + 'static) -> Callback<T> {
    Callback::new(move |outcome| {
        let (value, reason) = split(outcome);
        f(value, reason)
    })
}

/// Splits an outcome into the two-argument shape.
pub fn split<T>(outcome: Outcome<T>) -> (Option<T>, Option<String>) {
    match outcome {
        Ok(value) => (Some(value), None),
        Err(err) => (None, Some(err.reason())),
    }
}

/// Reads the two-argument shape back into an outcome.
///
/// An absent value is a failure; a missing reason becomes an empty one.
pub fn from_legacy<T>(value: Option<T>, reason: Option<String>) -> Outcome<T> {
    match value {
        Some(value) => Ok(value),
        None => Err(TaskError::fail(reason.unwrap_or_default())),
    }
}
