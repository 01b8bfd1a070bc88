//! # Per-activation state of an iteration combinator.
//!
//! One [`Activation`] exists per `run` of `repeat`/`chained` and of the
//! sequential engine primitives (`fallback`, `sequence`). It owns:
//! - the outer callback (taken on settlement, so it fires at most once),
//! - the **live round token**: the child token of the round currently in
//!   flight, replaced before each re-invocation,
//! - a trampoline (`driving` + `next`) that turns synchronously completing
//!   rounds into a loop instead of nested calls.
//!
//! ```text
//! enqueue(v) ─► driving? ── yes ─► store v, return (the loop picks it up)
//!                   │
//!                   no
//!                   ▼
//!          loop { next_round() ─► launch(child, v) ─► [round may settle
//!                                                      synchronously and
//!                                                      enqueue again] }
//! ```
//!
//! ## Rules
//! - At most one round is in flight; a new round starts only after the
//!   previous one reported success.
//! - Cancelling the activation token cancels the live round token (it is a
//!   child), so a cancel always reaches the active round.
//! - After cancellation no round starts and no outcome is delivered.

use std::cell::{Cell, RefCell};

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind, emit};
use crate::tasks::Callback;

pub(crate) struct Activation<T, O> {
    name: &'static str,
    ctx: CancellationToken,
    bus: Option<Bus>,
    done: RefCell<Option<Callback<O>>>,
    live: RefCell<Option<CancellationToken>>,
    round: Cell<u32>,
    driving: Cell<bool>,
    next: RefCell<Option<T>>,
}

impl<T, O: 'static> Activation<T, O> {
    pub(crate) fn new(
        name: &'static str,
        ctx: CancellationToken,
        bus: Option<Bus>,
        done: Callback<O>,
    ) -> Self {
        Self {
            name,
            ctx,
            bus,
            done: RefCell::new(Some(done)),
            live: RefCell::new(None),
            round: Cell::new(0),
            driving: Cell::new(false),
            next: RefCell::new(None),
        }
    }

    /// Queues the input of the next round.
    ///
    /// Returns `true` when the caller must drive the loop, `false` when a
    /// loop further up the stack is already driving and will pick it up.
    pub(crate) fn enqueue(&self, input: T) -> bool {
        *self.next.borrow_mut() = Some(input);
        !self.driving.replace(true)
    }

    /// Takes the queued input and opens a round for it.
    ///
    /// Returns the round's token, or `None` when nothing is queued or the
    /// activation was cancelled or settled.
    pub(crate) fn next_round(&self) -> Option<(CancellationToken, T)> {
        let input = self.next.borrow_mut().take()?;
        if self.ctx.is_cancelled() || self.done.borrow().is_none() {
            return None;
        }

        let round = self.round.get() + 1;
        self.round.set(round);
        let child = self.ctx.child_token();
        if let Some(prev) = self.live.replace(Some(child.clone())) {
            prev.cancel();
        }
        emit(self.bus.as_ref(), || {
            Event::new(EventKind::RoundStarted)
                .with_task(self.name)
                .with_round(round)
        });
        Some((child, input))
    }

    /// Number of rounds opened so far.
    pub(crate) fn round(&self) -> u32 {
        self.round.get()
    }

    /// Ends a driving loop.
    pub(crate) fn release(&self) {
        self.driving.set(false);
    }

    /// Whether a round outcome must be dropped.
    ///
    /// Publishes `OutcomeSuppressed` when it must.
    pub(crate) fn suppressed(&self) -> bool {
        if self.ctx.is_cancelled() {
            emit(self.bus.as_ref(), || {
                Event::new(EventKind::OutcomeSuppressed).with_task(self.name)
            });
            return true;
        }
        false
    }

    pub(crate) fn round_succeeded(&self) {
        emit(self.bus.as_ref(), || {
            Event::new(EventKind::RoundSucceeded)
                .with_task(self.name)
                .with_round(self.round.get())
        });
    }

    pub(crate) fn succeed(&self, value: O) {
        if let Some(done) = self.take_done() {
            emit(self.bus.as_ref(), || {
                Event::new(EventKind::Settled)
                    .with_task(self.name)
                    .with_round(self.round.get())
            });
            done.succeed(value);
        }
    }

    pub(crate) fn fail(&self, err: TaskError) {
        if let Some(done) = self.take_done() {
            emit(self.bus.as_ref(), || {
                Event::new(EventKind::TaskFailed)
                    .with_task(self.name)
                    .with_round(self.round.get())
                    .with_reason(err.reason())
            });
            done.fail(err);
        }
    }

    /// Takes the outer callback, releasing the live round token.
    fn take_done(&self) -> Option<Callback<O>> {
        if self.suppressed() {
            return None;
        }
        let done = self.done.borrow_mut().take();
        if let Some(live) = self.live.borrow_mut().take() {
            live.cancel();
        }
        done
    }
}
