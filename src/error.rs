//! Error types used by the combinators.
//!
//! This module defines three enums:
//!
//! - [`TaskError`] - failures reported through a task's outcome callback.
//! - [`ConfigError`] - construction-time failures of a combinator builder.
//! - [`TimerError`] - failures of the timer collaborator when arming a timer.
//!
//! A [`TaskError`]'s `Display` output is exactly the failure reason text that
//! travels on the outcome channel, so `err.to_string()` is the reason.

use thiserror::Error;

/// # Errors reported through the outcome channel.
///
/// These represent failures of a single task activation. They never cross the
/// asynchronous boundary as panics; every combinator forwards them unchanged.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Generic failure carrying the reason verbatim.
    #[error("{reason}")]
    Fail {
        /// The failure reason.
        reason: String,
    },

    /// A polling deadline elapsed before the predicate held.
    #[error("Timeout exceeded")]
    Timeout,

    /// A value was rejected by a predicate.
    #[error("{message}")]
    Predicate {
        /// The diagnostic message.
        message: String,
    },

    /// A timer could not be armed.
    #[error("{reason}")]
    Timer {
        /// The timer collaborator's message.
        reason: String,
    },

    /// The outer input did not have the expected shape.
    #[error("{reason}")]
    InvalidInput {
        /// Fixed diagnostic for the malformed input.
        reason: &'static str,
    },

    /// The wrapped function or future panicked.
    #[error("{info}")]
    Panicked {
        /// The panic payload rendered as text.
        info: String,
    },

    /// A composition primitive received an empty collection it cannot settle.
    #[error("no tasks to run")]
    NoTasks,

    /// A single-use promise task was activated a second time.
    #[error("promise already consumed")]
    Consumed,

    /// A future-backed task was started outside an async runtime.
    #[error("no async runtime available")]
    NoRuntime,

    /// A future-backed task was started inside a runtime but outside a
    /// `tokio::task::LocalSet`.
    #[error("no local task set available")]
    NoLocalSet,
}

impl TaskError {
    /// Builds a [`TaskError::Fail`] from any displayable reason.
    pub fn fail(reason: impl Into<String>) -> Self {
        TaskError::Fail {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use requestors::TaskError;
    ///
    /// assert_eq!(TaskError::Timeout.as_label(), "task_timeout");
    /// assert_eq!(TaskError::fail("boom").as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Timeout => "task_timeout",
            TaskError::Predicate { .. } => "task_predicate_rejected",
            TaskError::Timer { .. } => "task_timer_failed",
            TaskError::InvalidInput { .. } => "task_invalid_input",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::NoTasks => "task_no_tasks",
            TaskError::Consumed => "task_consumed",
            TaskError::NoRuntime => "task_no_runtime",
            TaskError::NoLocalSet => "task_no_local_set",
        }
    }

    /// Returns the failure reason as carried on the two-channel callback.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl From<TimerError> for TaskError {
    fn from(err: TimerError) -> Self {
        TaskError::Timer {
            reason: err.to_string(),
        }
    }
}

/// # Errors raised while building a combinator.
///
/// Missing required configuration is fatal to that construction attempt and
/// is returned from `build()`; it is never turned into a task failure.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `Chained` was built without a continuer.
    #[error("Continuer function missing")]
    MissingContinuer,

    /// `Chained` was built without an aggregator.
    #[error("Aggregator function missing")]
    MissingAggregator,

    /// `Wait` was built without a predicate.
    #[error("Invalid predicate function")]
    MissingPredicate,

    /// `Wait` was built without a polling interval.
    #[error("No interval value specified")]
    MissingInterval,

    /// `Wait` was given a zero polling interval.
    #[error("Interval must be greater than zero")]
    ZeroInterval,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::MissingContinuer => "config_missing_continuer",
            ConfigError::MissingAggregator => "config_missing_aggregator",
            ConfigError::MissingPredicate => "config_missing_predicate",
            ConfigError::MissingInterval => "config_missing_interval",
            ConfigError::ZeroInterval => "config_zero_interval",
        }
    }
}

/// # Errors raised by a timer collaborator.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// No async runtime is available to drive the timer.
    #[error("no timer runtime available")]
    NoRuntime,

    /// The runtime has no `LocalSet` to host the timer task.
    #[error("no local task set to host the timer")]
    NoLocalSet,

    /// The collaborator refused to allocate another timer.
    #[error("timer resources exhausted")]
    Exhausted,
}
