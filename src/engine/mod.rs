//! # Composition engine.
//!
//! Fan-out adapters do not run collections of tasks themselves; they build
//! the collection and hand it to an [`Engine`], which returns one aggregate
//! task:
//!
//! | primitive         | settles with                          | on failure                     |
//! |-------------------|---------------------------------------|--------------------------------|
//! | `race`            | first success                         | last failure, once all failed  |
//! | `parallel`        | every output, in input order          | first failure, rest cancelled  |
//! | `fallback`        | first success, tried one at a time    | last failure                   |
//! | `parallel_object` | every output, keyed like the input    | first failure, rest cancelled  |
//! | `sequence`        | last output, each fed to the next     | first failure                  |
//!
//! Every aggregate passes its own input to each member (`sequence` threads it
//! through instead). [`Options`](crate::Options) are forwarded to the engine
//! untouched; their enforcement is the engine's business.
//!
//! [`InlineEngine`] is the bundled implementation.

mod inline;

use std::collections::BTreeMap;

use crate::TaskRef;
use crate::config::Options;

pub use inline::InlineEngine;

/// Family of composition primitives consumed by the fan-out adapters.
pub trait Engine {
    /// First success wins; the others are cancelled.
    fn race<I, O>(&self, opts: Options, tasks: Vec<TaskRef<I, O>>) -> TaskRef<I, O>
    where
        I: Clone + 'static,
        O: 'static;

    /// All must succeed; outputs keep the order of `tasks`.
    fn parallel<I, O>(&self, opts: Options, tasks: Vec<TaskRef<I, O>>) -> TaskRef<I, Vec<O>>
    where
        I: Clone + 'static,
        O: 'static;

    /// Tries `tasks` in order until one succeeds.
    fn fallback<I, O>(&self, opts: Options, tasks: Vec<TaskRef<I, O>>) -> TaskRef<I, O>
    where
        I: Clone + 'static,
        O: 'static;

    /// Keyed variant of [`parallel`](Engine::parallel).
    fn parallel_object<K, I, O>(
        &self,
        opts: Options,
        tasks: BTreeMap<K, TaskRef<I, O>>,
    ) -> TaskRef<I, BTreeMap<K, O>>
    where
        K: Ord + Clone + 'static,
        I: Clone + 'static,
        O: 'static;

    /// Runs `tasks` one after another, piping each output into the next input.
    fn sequence<T>(&self, opts: Options, tasks: Vec<TaskRef<T, T>>) -> TaskRef<T, T>
    where
        T: 'static;
}
