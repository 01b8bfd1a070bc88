//! # Leaf adapters.
//!
//! Lift plain values, synchronous functions, futures and predicates into tasks:
//! - [`constant`] - fixed success value, input ignored
//! - [`unary`] - fallible synchronous function
//! - [`promise`] / [`promise_once`] - futures driven on the local set
//! - [`conditional`] - predicate gate that passes its input through

mod conditional;
mod constant;
mod promise;
mod unary;

pub use conditional::{Conditional, conditional};
pub use constant::{Constant, constant};
pub use promise::{Promise, PromiseOnce, promise, promise_once};
pub use unary::{Unary, unary};
