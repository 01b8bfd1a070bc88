//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for plugging custom event handlers
//! into a [`listen`](super::listen) loop.
//!
//! ## Rules
//! - Events are processed sequentially (FIFO) per listener.
//! - A panic inside [`Subscribe::on_event`] is caught and published as
//!   `EventKind::SubscriberPanicked`; other subscribers still see the event.
//!
//! ## Example
//! ```rust
//! use requestors::{Event, EventKind, Subscribe};
//!
//! struct Failures(std::cell::Cell<u32>);
//!
//! impl Subscribe for Failures {
//!     fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::TaskFailed) {
//!             self.0.set(self.0.get() + 1);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failures" }
//! }
//! ```

use crate::events::Event;

/// Event subscriber for combinator observability.
///
/// ### Implementation requirements
/// - Keep `on_event` short; it runs on the event loop thread.
/// - Handle errors internally; do not panic.
pub trait Subscribe {
    /// Processes a single event.
    fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in panic events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
