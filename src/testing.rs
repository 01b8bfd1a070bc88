//! Shared helpers for unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use crate::{Callback, Outcome, TaskFn, TaskRef};

/// Records every outcome delivered to its callbacks.
pub(crate) struct Probe<T> {
    log: Rc<RefCell<Vec<Outcome<T>>>>,
}

impl<T: Clone + 'static> Probe<T> {
    pub(crate) fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub(crate) fn callback(&self) -> Callback<T> {
        let log = self.log.clone();
        Callback::new(move |o| log.borrow_mut().push(o))
    }

    pub(crate) fn outcomes(&self) -> Vec<Outcome<T>> {
        self.log.borrow().clone()
    }

    pub(crate) fn count(&self) -> usize {
        self.log.borrow().len()
    }
}

/// A task that parks its activations so tests can settle them by hand.
pub(crate) struct Deferred<I, O> {
    pending: Rc<RefCell<Vec<(CancellationToken, I, Callback<O>)>>>,
    started: Rc<Cell<usize>>,
}

impl<I: 'static, O: 'static> Deferred<I, O> {
    pub(crate) fn new() -> Self {
        Self {
            pending: Rc::new(RefCell::new(Vec::new())),
            started: Rc::new(Cell::new(0)),
        }
    }

    pub(crate) fn task(&self) -> TaskRef<I, O> {
        let pending = self.pending.clone();
        let started = self.started.clone();
        TaskFn::rc("deferred", move |ctx: CancellationToken, input: I, done: Callback<O>| {
            started.set(started.get() + 1);
            pending.borrow_mut().push((ctx, input, done));
        })
    }

    /// Number of activations started so far.
    pub(crate) fn started(&self) -> usize {
        self.started.get()
    }

    /// Number of activations parked and not yet settled.
    pub(crate) fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Token of the oldest parked activation.
    pub(crate) fn token(&self, idx: usize) -> CancellationToken {
        self.pending.borrow()[idx].0.clone()
    }

    /// Settles the oldest parked activation with `f(input)`.
    pub(crate) fn settle(&self, f: impl FnOnce(I) -> Outcome<O>) {
        let (_ctx, input, done) = self.pending.borrow_mut().remove(0);
        done.call(f(input));
    }
}
