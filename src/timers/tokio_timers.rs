//! Timers backed by `tokio::time`, spawned on the current `LocalSet`.
//!
//! Each timer is a local task `select!`-ing between its handle's token and the
//! next deadline, so cancelling the handle ends the task at once.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{TimerHandle, Timers};
use crate::error::TimerError;

/// `tokio::time`-backed [`Timers`].
///
/// Arming a timer outside any runtime fails with [`TimerError::NoRuntime`];
/// inside a runtime but outside a `LocalSet` it fails with
/// [`TimerError::NoLocalSet`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioTimers;

/// Spawns `fut` on the current `LocalSet`.
///
/// `tokio::task::spawn_local` panics when no `LocalSet` is running; that
/// panic is caught here and returned as [`TimerError::NoLocalSet`], with
/// `fut` dropped unpolled.
pub(crate) fn spawn_local<F>(fut: F) -> Result<(), TimerError>
where
    F: Future<Output = ()> + 'static,
{
    tokio::runtime::Handle::try_current().map_err(|_| TimerError::NoRuntime)?;
    panic::catch_unwind(AssertUnwindSafe(move || {
        tokio::task::spawn_local(fut);
    }))
    .map_err(|_| TimerError::NoLocalSet)
}

impl Timers for TokioTimers {
    fn set_interval(
        &self,
        scope: &CancellationToken,
        period: Duration,
        mut tick: Box<dyn FnMut()>,
    ) -> Result<TimerHandle, TimerError> {
        let token = scope.child_token();
        let stop = token.clone();

        spawn_local(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    _ = interval.tick() => tick(),
                }
            }
        })?;
        Ok(TimerHandle::new(token))
    }

    fn set_timeout(
        &self,
        scope: &CancellationToken,
        delay: Duration,
        fire: Box<dyn FnOnce()>,
    ) -> Result<TimerHandle, TimerError> {
        let token = scope.child_token();
        let stop = token.clone();

        spawn_local(async move {
            tokio::select! {
                biased;
                _ = stop.cancelled() => {}
                _ = time::sleep(delay) => {
                    stop.cancel();
                    fire();
                }
            }
        })?;
        Ok(TimerHandle::new(token))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use tokio::task::LocalSet;

    use super::*;

    #[test]
    fn no_runtime_is_an_error() {
        let err = TokioTimers
            .set_timeout(&CancellationToken::new(), Duration::from_millis(1), Box::new(|| {}))
            .unwrap_err();
        assert_eq!(err, TimerError::NoRuntime);
    }

    #[tokio::test]
    async fn outside_local_set_is_an_error() {
        let scope = CancellationToken::new();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();

        let err = TokioTimers
            .set_timeout(&scope, Duration::from_millis(1), Box::new(move || f.set(true)))
            .unwrap_err();
        assert_eq!(err, TimerError::NoLocalSet);

        let err = TokioTimers
            .set_interval(&scope, Duration::from_millis(1), Box::new(|| {}))
            .unwrap_err();
        assert_eq!(err, TimerError::NoLocalSet);

        time::sleep(Duration::from_millis(5)).await;
        assert!(!fired.get());
    }

    #[tokio::test(start_paused = true)]
    async fn interval_ticks_until_cancelled() {
        let ticks = Rc::new(Cell::new(0));
        let local = LocalSet::new();

        local
            .run_until(async {
                let t = ticks.clone();
                let handle = TokioTimers
                    .set_interval(
                        &CancellationToken::new(),
                        Duration::from_millis(10),
                        Box::new(move || t.set(t.get() + 1)),
                    )
                    .expect("armed");

                time::sleep(Duration::from_millis(35)).await;
                handle.cancel();
                time::sleep(Duration::from_millis(50)).await;
            })
            .await;

        assert_eq!(ticks.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_scope_stops_pending_timeout() {
        let fired = Rc::new(Cell::new(false));
        let local = LocalSet::new();

        local
            .run_until(async {
                let f = fired.clone();
                let scope = CancellationToken::new();
                let _handle = TokioTimers
                    .set_timeout(&scope, Duration::from_millis(20), Box::new(move || f.set(true)))
                    .expect("armed");
                time::sleep(Duration::from_millis(5)).await;
                scope.cancel();
                time::sleep(Duration::from_millis(50)).await;
            })
            .await;

        assert!(!fired.get());
    }
}
