//! # Event bus for broadcasting combinator events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from any activation. Publishing is a plain
//! synchronous call, so combinators can publish from inside outcome callbacks.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for combinator events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for Bus {
    /// A bus with capacity 1024.
    fn default() -> Self {
        Self::new(1024)
    }
}

/// Publishes to an optional bus; `None` means the activation is unobserved.
pub(crate) fn emit(bus: Option<&Bus>, ev: impl FnOnce() -> Event) {
    if let Some(bus) = bus {
        bus.publish(ev());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn receivers_see_events_published_after_subscribe() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::Settled));
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::RoundStarted).with_round(1));

        let ev = rx.try_recv().expect("event");
        assert_eq!(ev.kind, EventKind::RoundStarted);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn emit_without_bus_is_a_no_op() {
        emit(None, || panic!("event must not be built"));
    }
}
