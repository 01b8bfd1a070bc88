//! # Polling with real timers
//!
//! Demonstrates:
//! - `wait` driven by `TokioTimers` on a `LocalSet`
//! - a `promise` raising the polled flag from another local task
//! - the deadline path (`Timeout exceeded`)
//! - cancelling an activation before it settles

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::LocalSet;

use requestors::{Callback, Outcome, TaskExt, TokioTimers, promise, wait};

/// Resolves once the callback fires.
fn settled<T: 'static>() -> (Callback<T>, oneshot::Receiver<Outcome<T>>) {
    let (tx, rx) = oneshot::channel();
    (
        Callback::new(move |o| {
            let _ = tx.send(o);
        }),
        rx,
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let local = LocalSet::new();
    local.run_until(run()).await
}

async fn run() -> anyhow::Result<()> {
    let ready = Rc::new(Cell::new(false));

    // Raise the flag after 120ms.
    let r = ready.clone();
    let raise = promise(move || {
        let r = r.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(120)).await;
            r.set(true);
            Ok::<_, std::convert::Infallible>(())
        }
    });
    raise.start((), Callback::new(|_| println!("⚑ flag raised")));

    let r = ready.clone();
    let poll = wait()
        .predicate(move || r.get())
        .interval(Duration::from_millis(25))
        .timeout(Duration::from_secs(1))
        .timers(TokioTimers)
        .value("ready")
        .build()?;

    let (cb, rx) = settled();
    poll.start(None, cb);
    println!("⏱  wait(ready): {:?}", rx.await?);

    // Never satisfied: hits the deadline.
    let stuck = wait()
        .predicate(|| false)
        .interval(Duration::from_millis(25))
        .timeout(Duration::from_millis(100))
        .timers(TokioTimers)
        .value(())
        .build()?;

    let (cb, rx) = settled();
    stuck.start(None, cb);
    match rx.await? {
        Ok(()) => println!("⏱  wait(stuck): unexpectedly satisfied"),
        Err(err) => println!("⏱  wait(stuck): {err}"),
    }

    // Cancelled before settling: no outcome, timers released.
    let (cb, rx) = settled::<()>();
    let handle = stuck.start(None, cb);
    tokio::time::sleep(Duration::from_millis(30)).await;
    handle.cancel();
    // Cancelling drops the callback, which closes the channel unsent.
    match tokio::time::timeout(Duration::from_millis(200), rx).await {
        Ok(Ok(_)) => println!("✗ cancelled wait still reported"),
        Ok(Err(_)) | Err(_) => println!("✓ cancelled wait stayed silent"),
    }
    Ok(())
}
