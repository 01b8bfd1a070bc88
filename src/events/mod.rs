//! Combinator events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by iteration combinators, the polling
//! combinator and the bundled composition engine.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Repeat`, `Chained`, `Wait`, `InlineEngine` (when built `with_bus`).
//! - **Consumers**: [`listen`](crate::subscribers::listen) fans events out to
//!   [`Subscribe`](crate::Subscribe) implementations; tests read receivers directly.

mod bus;
mod event;

pub(crate) use bus::emit;
pub use bus::Bus;
pub use event::{Event, EventKind};
