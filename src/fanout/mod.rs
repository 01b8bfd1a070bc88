//! # Fan-out adapters.
//!
//! Two shapes, both delegating execution to an [`Engine`](crate::Engine):
//! - **one task, many inputs**: [`applied_race`], [`applied_parallel`],
//!   [`applied_fallback`], [`applied_parallel_object`]
//! - **many tasks, one structured input**: [`indexed`] (by position),
//!   [`record`] (by key)
//!
//! [`kleisli_sequence`] chains tasks that return [`Logged`] values.
//! The [`json`] module offers the same adapters over untyped JSON input.

mod applied;
mod indexed;
mod kleisli;
mod placeholder;
mod preload;
mod record;

pub mod json;

pub use applied::{Applied, AppliedObject, applied_fallback, applied_parallel, applied_parallel_object, applied_race};
pub use indexed::{Indexed, indexed};
pub use kleisli::{Kleisli, Logged, Monoid, kleisli_sequence};
pub use placeholder::{EmptyRecord, Placeholder, placeholder};
pub use preload::{Preloaded, preloaded};
pub use record::{Record, record};
