//! # Composition options.
//!
//! Provides [`Options`], the settings record handed to every composition
//! primitive of an [`Engine`](crate::Engine) (`race`, `parallel`, `fallback`,
//! `parallel_object`, `sequence`) and to the fan-out adapters that delegate to
//! them.
//!
//! ## Sentinel values
//! - `time_limit = 0s` → no time limit
//! - `throttle = 0` → unlimited concurrency
//!
//! Options are forwarded verbatim; what they mean is up to the engine.

use std::time::Duration;

/// How a time limit applies to required versus optional tasks of a
/// `parallel` composition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeOption {
    /// Optional tasks must finish before the time limit (default).
    #[default]
    OptionalWithinLimit,
    /// Required tasks must finish before the time limit; optional tasks may
    /// keep running until the required ones finish.
    RequiredWithinLimit,
    /// The time limit applies to optional tasks only; required tasks have
    /// no limit.
    RequiredUnlimited,
}

/// Options record accepted by the composition engine.
///
/// ## Field semantics
/// - `time_limit`: Deadline for the whole composition (`0s` = none)
/// - `time_option`: How `time_limit` treats optional tasks
/// - `throttle`: Maximum number of tasks in flight at once (`0` = unlimited)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across engine implementations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// Deadline for the whole composition.
    pub time_limit: Duration,
    /// Time-limit mode for `parallel` compositions.
    pub time_option: TimeOption,
    /// Concurrency cap.
    pub throttle: usize,
}

impl Options {
    /// Returns the time limit as an `Option`.
    ///
    /// - `None` → no time limit
    /// - `Some(d)` → the composition must settle within `d`
    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        if self.time_limit == Duration::ZERO {
            None
        } else {
            Some(self.time_limit)
        }
    }

    /// Returns the concurrency cap as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` tasks in flight
    #[inline]
    pub fn throttle_limit(&self) -> Option<usize> {
        if self.throttle == 0 {
            None
        } else {
            Some(self.throttle)
        }
    }

    /// Returns options with the given time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Returns options with the given time-limit mode.
    pub fn with_time_option(mut self, option: TimeOption) -> Self {
        self.time_option = option;
        self
    }

    /// Returns options with the given concurrency cap.
    pub fn with_throttle(mut self, throttle: usize) -> Self {
        self.throttle = throttle;
        self
    }

    /// Whether any execution constraint is set.
    pub(crate) fn is_constrained(&self) -> bool {
        self.time_limit().is_some() || self.throttle_limit().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sentinels_mean_unset() {
        let opts = Options::default();
        assert_eq!(opts.time_limit(), None);
        assert_eq!(opts.throttle_limit(), None);
        assert!(!opts.is_constrained());
    }

    #[test]
    fn builders_set_limits() {
        let opts = Options::default()
            .with_time_limit(Duration::from_millis(250))
            .with_throttle(4)
            .with_time_option(TimeOption::RequiredWithinLimit);
        assert_eq!(opts.time_limit(), Some(Duration::from_millis(250)));
        assert_eq!(opts.throttle_limit(), Some(4));
        assert_eq!(opts.time_option, TimeOption::RequiredWithinLimit);
        assert!(opts.is_constrained());
    }
}
