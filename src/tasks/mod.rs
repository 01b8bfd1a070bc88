//! # Task contract.
//!
//! This module provides the types every combinator produces and consumes:
//! - [`Task`] - trait for callback-driven, cancelable activations
//! - [`TaskRef`] - shared reference to a task (`Rc<dyn Task>`)
//! - [`TaskExt`] - `start` entry point returning the cancellation handle
//! - [`TaskFn`] - closure-backed task
//! - [`Callback`] / [`Outcome`] - single-use outcome delivery and its payload

pub mod callback;
mod task;
mod task_fn;

pub use callback::{Callback, FunctionalCallback, Outcome, functional_callback};
pub use task::{Task, TaskExt, TaskRef};
pub use task_fn::TaskFn;
