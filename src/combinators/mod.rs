//! # Iteration and polling combinators.
//!
//! - [`repeat`] re-runs a task on its own output while a predicate holds.
//! - [`chained`] re-runs a task, folding each output into an accumulator.
//! - [`wait`] polls a predicate on a timer, with an optional deadline.
//!
//! Iteration combinators keep at most one inner activation in flight and
//! track its token in a per-activation slot, so a cancel issued during round
//! N reaches round N. All three accept `.with_bus(bus)` to publish
//! [`Event`](crate::Event)s.

pub(crate) mod activation;
mod chained;
mod repeat;
mod wait;

pub use chained::{Chained, ChainedBuilder, ChainedFactory, chained};
pub use repeat::{Repeat, repeat};
pub use wait::{Wait, WaitBuilder, wait};
