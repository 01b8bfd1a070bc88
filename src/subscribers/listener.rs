//! # Subscriber listener loop.
//!
//! [`listen`] drains a [`Bus`](crate::Bus) receiver and fans every event out to
//! a set of subscribers until the bus is dropped.
//!
//! ```text
//! Bus ──► listen(rx) ──┬──► sub1.on_event()
//!                      ├──► sub2.on_event()   (panic → SubscriberPanicked)
//!                      └──► subN.on_event()
//! ```
//!
//! ## Panic handling
//! Each delivery is wrapped in `catch_unwind`:
//! - Panic is caught and converted to a `SubscriberPanicked` event delivered to
//!   the remaining subscribers
//! - The listener continues with the next event
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave subscriber state
//! inconsistent if it panics halfway through an update.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use tokio::sync::broadcast::{self, error::RecvError};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Runs until every sender of the bus is dropped.
///
/// Lagging behind the bus capacity produces a `SubscriberLagged` event carrying
/// the number of skipped events.
pub async fn listen(mut rx: broadcast::Receiver<Event>, subs: Vec<Rc<dyn Subscribe>>) {
    loop {
        let ev = match rx.recv().await {
            Ok(ev) => ev,
            Err(RecvError::Lagged(skipped)) => {
                Event::new(EventKind::SubscriberLagged).with_count(skipped)
            }
            Err(RecvError::Closed) => break,
        };
        dispatch(&subs, &ev);
    }
}

/// Delivers one event to every subscriber, isolating panics.
pub fn dispatch(subs: &[Rc<dyn Subscribe>], ev: &Event) {
    let mut panicked = Vec::new();
    for (idx, sub) in subs.iter().enumerate() {
        if let Err(panic_err) = catch_unwind(AssertUnwindSafe(|| sub.on_event(ev))) {
            panicked.push((idx, Event::subscriber_panicked(sub.name(), panic_info(&*panic_err))));
        }
    }
    for (culprit, report) in panicked {
        for (idx, sub) in subs.iter().enumerate() {
            if idx != culprit {
                let _ = catch_unwind(AssertUnwindSafe(|| sub.on_event(&report)));
            }
        }
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_info(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
