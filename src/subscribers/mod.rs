//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`listen`] loop that
//! delivers events broadcast through a [`Bus`](crate::Bus).
//!
//! ```text
//!   Repeat / Chained / Wait / InlineEngine ── publish(Event) ──► Bus
//!                                                                 │
//!                                       listen(bus.subscribe()) ◄─┘
//!                                             │
//!                                  ┌──────────┼──────────┐
//!                                  ▼          ▼          ▼
//!                              LogWriter   Metrics    Custom
//! ```

mod listener;
#[cfg(feature = "logging")]
mod log;
mod subscriber;

pub use listener::{dispatch, listen};
pub(crate) use listener::panic_info;
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
