//! # Virtual-time timers.
//!
//! [`ManualClock`] keeps its own notion of "now" and fires timers only when
//! [`ManualClock::advance`] moves time past their deadline. Timers due at the
//! same instant fire in the order they were armed.
//!
//! ```
//! use std::{cell::Cell, rc::Rc, time::Duration};
//! use tokio_util::sync::CancellationToken;
//! use requestors::{ManualClock, Timers};
//!
//! let clock = ManualClock::new();
//! let scope = CancellationToken::new();
//! let hits = Rc::new(Cell::new(0));
//! let h = hits.clone();
//! clock.set_interval(&scope, Duration::from_millis(10), Box::new(move || h.set(h.get() + 1))).unwrap();
//!
//! clock.advance(Duration::from_millis(25));
//! assert_eq!(hits.get(), 2);
//!
//! scope.cancel();
//! assert_eq!(clock.pending(), 0);
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{TimerHandle, Timers};
use crate::error::TimerError;

enum Action {
    Once(Box<dyn FnOnce()>),
    Every(Duration, Box<dyn FnMut()>),
}

struct Entry {
    id: u64,
    due: Duration,
    token: CancellationToken,
    action: Action,
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry>,
    exhausted: bool,
}

/// Deterministic [`Timers`] driven by explicit calls to [`advance`](Self::advance).
#[derive(Clone, Default)]
pub struct ManualClock {
    state: Rc<RefCell<ClockState>>,
}

impl ManualClock {
    /// Creates a clock at time zero with no timers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed virtual time.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of armed timers that have not been cancelled or fired.
    pub fn pending(&self) -> usize {
        self.state
            .borrow()
            .entries
            .iter()
            .filter(|e| !e.token.is_cancelled())
            .count()
    }

    /// Makes every later `set_*` call fail with [`TimerError::Exhausted`].
    pub fn exhaust(&self) {
        self.state.borrow_mut().exhausted = true;
    }

    /// Undoes [`exhaust`](Self::exhaust).
    pub fn replenish(&self) {
        self.state.borrow_mut().exhausted = false;
    }

    /// Moves time forward by `by`, firing every timer that comes due on the way.
    ///
    /// Callbacks run with no clock borrow held, so they may arm or cancel timers.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        while let Some(entry) = self.next_due(target) {
            match entry.action {
                Action::Once(fire) => {
                    entry.token.cancel();
                    fire();
                }
                Action::Every(period, mut tick) => {
                    tick();
                    if !entry.token.is_cancelled() {
                        self.state.borrow_mut().entries.push(Entry {
                            id: entry.id,
                            due: entry.due + period,
                            token: entry.token,
                            action: Action::Every(period, tick),
                        });
                    }
                }
            }
        }
        self.state.borrow_mut().now = target;
    }

    /// Removes and returns the earliest live entry due at or before `target`,
    /// moving `now` to its deadline.
    fn next_due(&self, target: Duration) -> Option<Entry> {
        let mut state = self.state.borrow_mut();
        state.entries.retain(|e| !e.token.is_cancelled());
        let idx = state
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= target)
            .min_by_key(|(_, e)| (e.due, e.id))
            .map(|(idx, _)| idx)?;
        let entry = state.entries.swap_remove(idx);
        state.now = entry.due;
        Some(entry)
    }

    fn arm(
        &self,
        scope: &CancellationToken,
        delay: Duration,
        action: Action,
    ) -> Result<TimerHandle, TimerError> {
        let mut state = self.state.borrow_mut();
        if state.exhausted {
            return Err(TimerError::Exhausted);
        }
        let token = scope.child_token();
        let id = state.next_id;
        state.next_id += 1;
        let due = state.now + delay;
        state.entries.push(Entry {
            id,
            due,
            token: token.clone(),
            action,
        });
        Ok(TimerHandle::new(token))
    }
}

impl Timers for ManualClock {
    fn set_interval(
        &self,
        scope: &CancellationToken,
        period: Duration,
        tick: Box<dyn FnMut()>,
    ) -> Result<TimerHandle, TimerError> {
        self.arm(scope, period, Action::Every(period, tick))
    }

    fn set_timeout(
        &self,
        scope: &CancellationToken,
        delay: Duration,
        fire: Box<dyn FnOnce()>,
    ) -> Result<TimerHandle, TimerError> {
        self.arm(scope, delay, Action::Once(fire))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn cancelling_the_scope_releases_its_timers() {
        let clock = ManualClock::new();
        let scope = CancellationToken::new();
        let other = CancellationToken::new();
        clock.set_timeout(&scope, ms(5), Box::new(|| panic!("fired"))).unwrap();
        clock.set_interval(&scope, ms(5), Box::new(|| panic!("ticked"))).unwrap();
        clock.set_timeout(&other, ms(5), Box::new(|| {})).unwrap();

        scope.cancel();
        assert_eq!(clock.pending(), 1);
        clock.advance(ms(10));
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn same_instant_fires_in_arming_order() {
        let clock = ManualClock::new();
        let scope = CancellationToken::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        clock
            .set_interval(&scope, ms(10), Box::new(move || o.borrow_mut().push("tick")))
            .unwrap();
        let o = order.clone();
        clock
            .set_timeout(&scope, ms(20), Box::new(move || o.borrow_mut().push("timeout")))
            .unwrap();

        clock.advance(ms(20));
        assert_eq!(*order.borrow(), vec!["tick", "tick", "timeout"]);
        assert_eq!(clock.now(), ms(20));
        assert_eq!(clock.pending(), 1);
    }

    #[test]
    fn cancelled_timers_are_released() {
        let clock = ManualClock::new();
        let scope = CancellationToken::new();
        let handle = clock.set_timeout(&scope, ms(5), Box::new(|| panic!("fired"))).unwrap();
        handle.cancel();
        handle.cancel();
        assert_eq!(clock.pending(), 0);
        clock.advance(ms(10));
    }

    #[test]
    fn callbacks_may_cancel_their_own_interval() {
        let clock = ManualClock::new();
        let scope = CancellationToken::new();
        let slot: Rc<RefCell<Option<TimerHandle>>> = Rc::new(RefCell::new(None));
        let ticks = Rc::new(RefCell::new(0));

        let (s, t) = (slot.clone(), ticks.clone());
        let handle = clock
            .set_interval(
                &scope,
                ms(3),
                Box::new(move || {
                    *t.borrow_mut() += 1;
                    if *t.borrow() == 2 {
                        if let Some(h) = s.borrow().as_ref() {
                            h.cancel();
                        }
                    }
                }),
            )
            .unwrap();
        *slot.borrow_mut() = Some(handle);

        clock.advance(ms(30));
        assert_eq!(*ticks.borrow(), 2);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn exhausted_clock_refuses_timers() {
        let clock = ManualClock::new();
        let scope = CancellationToken::new();
        clock.exhaust();
        assert_eq!(
            clock.set_timeout(&scope, ms(1), Box::new(|| {})).unwrap_err(),
            TimerError::Exhausted
        );
        clock.replenish();
        assert!(clock.set_timeout(&scope, ms(1), Box::new(|| {})).is_ok());
    }
}
