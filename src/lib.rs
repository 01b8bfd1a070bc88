//! # requestors
//!
//! **Requestors** is a library of continuation-passing task combinators.
//!
//! A [`Task`] is started with an input and an outcome [`Callback`], returns
//! at once, and reports `Ok(value)` or `Err(reason)` at most once. Every
//! activation runs under a [`CancellationToken`](tokio_util::sync::CancellationToken);
//! cancelling it suppresses the outcome and releases timers and child
//! activations. The crate provides leaf adapters that lift plain values and
//! functions into tasks, iteration and polling combinators, and fan-out
//! adapters that hand collections of tasks to a composition [`Engine`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   constant  unary  promise  conditional        (leaf adapters)
//!       │       │       │          │
//!       └───────┴───┬───┴──────────┘
//!                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Task<I, O>: run(ctx, input, Callback<O>)                         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!  ┌────────────┐    ┌──────────────┐   ┌─────────────────────────────┐
//!  │  repeat    │    │    wait      │   │ applied_* / indexed / record│
//!  │  chained   │    │  (Timers)    │   │ kleisli_sequence            │
//!  │(Activation)│    └──────┬───────┘   └──────────────┬──────────────┘
//!  └─────┬──────┘           │                          ▼
//!        │                  │            ┌───────────────────────────┐
//!        │                  │            │ Engine: race / parallel / │
//!        │                  │            │ fallback / parallel_object│
//!        │                  │            │ / sequence                │
//!        │                  │            └─────────────┬─────────────┘
//!        │ Publishes        │ Publishes                │ Publishes
//!        │ - RoundStarted   │ - PollSatisfied          │ - Delegated
//!        │ - TaskFailed     │ - TimeoutHit             │ - OptionsNotHonored
//!        ▼                  ▼                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     Bus (broadcast channel)                       │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       subscribers::listen(rx, subs)
//!                           ┌───────┼───────┐
//!                           ▼       ▼       ▼
//!                        LogWriter  ...   custom
//! ```
//!
//! ### Iteration
//! ```text
//! repeat(p, task).run(v0)
//!
//! p(v0)? ── no ─► Ok(v0)
//!   │
//!   yes
//!   ▼
//! loop {
//!   ├─► round += 1, live token = ctx.child_token() (previous one cancelled)
//!   ├─► publish RoundStarted{ round }
//!   ├─► task.run(live, v)
//!   │       ├─ Err(e) ─► publish TaskFailed ─► Err(e), exit
//!   │       └─ Ok(v') ─► publish RoundSucceeded
//!   │                    ├─ p(v') ─► continue with v'
//!   │                    └─ !p(v') ─► publish Settled ─► Ok(v'), exit
//!   └─ ctx cancelled ─► no outcome, exit
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / functions                          |
//! |-------------------|----------------------------------------------------------------|------------------------------------------------|
//! | **Tasks**         | The task contract, closure-backed tasks, outcome callbacks.    | [`Task`], [`TaskExt`], [`TaskFn`], [`Callback`] |
//! | **Leaf adapters** | Lift values, functions, futures and predicates.                | [`constant`], [`unary`], [`promise`], [`conditional`] |
//! | **Iteration**     | Re-run a task while a predicate or continuer holds.            | [`repeat`], [`chained`]                        |
//! | **Polling**       | Poll a predicate on timers with an optional deadline.          | [`wait`], [`Timers`], [`ManualClock`]          |
//! | **Fan-out**       | Spread inputs or tasks over an engine primitive.               | [`applied_parallel`], [`indexed`], [`record`]  |
//! | **Engine**        | Composition primitives consumed by the fan-out adapters.       | [`Engine`], [`InlineEngine`], [`Options`]      |
//! | **Subscriber API**| Observe combinator events.                                     | [`Subscribe`], [`Bus`], [`Event`]              |
//! | **Errors**        | Execution and construction errors.                             | [`TaskError`], [`ConfigError`]                 |
//!
//! ## Optional features
//! - `logging`: exports a [`tracing`](https://docs.rs/tracing)-backed `LogWriter` subscriber.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use requestors::{chained, repeat, unary, wait, Callback, ManualClock, TaskExt};
//!
//! // Count to 3, one increment per round.
//! let inc = unary(|n: u32| Ok::<_, String>(n + 1));
//! repeat(|n: &u32| *n < 3, inc).start(0, Callback::new(|o| assert_eq!(o, Ok(3))));
//!
//! // Sum 4s until the total reaches 10.
//! let sum = chained()
//!     .continuer(|acc: &u32| *acc < 10)
//!     .aggregator(|acc: &u32, n: u32| acc + n)
//!     .build()?
//!     .over(unary(|_: u32| Ok::<_, String>(4)));
//! sum.start(0, Callback::new(|o| assert_eq!(o, Ok(12))));
//!
//! // Poll on a virtual clock until a deadline.
//! let clock = ManualClock::new();
//! let never = wait()
//!     .predicate(|| false)
//!     .interval(Duration::from_millis(10))
//!     .timeout(Duration::from_millis(30))
//!     .timers(clock.clone())
//!     .value(())
//!     .build()?;
//! never.start(None, Callback::new(|o| {
//!     assert_eq!(o.unwrap_err().to_string(), "Timeout exceeded");
//! }));
//! clock.advance(Duration::from_millis(30));
//! # Ok::<(), requestors::ConfigError>(())
//! ```

mod combinators;
mod config;
mod engine;
mod error;
mod events;
mod fanout;
mod leaf;
mod tasks;
mod timers;

pub mod subscribers;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use combinators::{Chained, ChainedBuilder, ChainedFactory, Repeat, Wait, WaitBuilder, chained, repeat, wait};
pub use config::{Options, TimeOption};
pub use engine::{Engine, InlineEngine};
pub use error::{ConfigError, TaskError, TimerError};
pub use events::{Bus, Event, EventKind};
pub use fanout::{
    Applied, AppliedObject, EmptyRecord, Indexed, Kleisli, Logged, Monoid, Placeholder, Preloaded, Record,
    applied_fallback, applied_parallel, applied_parallel_object, applied_race, indexed, json, kleisli_sequence,
    placeholder, preloaded, record,
};
pub use leaf::{Conditional, Constant, Promise, PromiseOnce, Unary, conditional, constant, promise, promise_once, unary};
pub use subscribers::Subscribe;
pub use tasks::callback;
pub use tasks::{Callback, FunctionalCallback, Outcome, Task, TaskExt, TaskFn, TaskRef, functional_callback};
pub use timers::{ManualClock, TimerHandle, Timers, TokioTimers};

// Optional: expose a tracing-backed logging subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
