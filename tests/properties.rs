//! End-to-end behaviour of the public combinators.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use requestors::{
    Callback, InlineEngine, ManualClock, Options, Outcome, Task, TaskError, TaskExt, TaskFn, TaskRef, chained, constant,
    record, repeat, unary, wait,
};

fn collect<T: 'static>() -> (Rc<RefCell<Vec<Outcome<T>>>>, Callback<T>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = log.clone();
    (log, Callback::new(move |o| l.borrow_mut().push(o)))
}

fn counting_inc(calls: Rc<Cell<u32>>) -> TaskRef<u32, u32> {
    TaskFn::rc("inc", move |_ctx: CancellationToken, n: u32, done: Callback<u32>| {
        calls.set(calls.get() + 1);
        done.succeed(n + 1);
    })
}

#[test]
fn constant_reports_synchronously_whatever_the_input() {
    let (log, cb) = collect();
    constant("v").start(42u64, cb);
    assert_eq!(*log.borrow(), vec![Ok("v")]);
}

#[test]
fn repeat_from_zero_runs_three_rounds() {
    let calls = Rc::new(Cell::new(0));
    let (log, cb) = collect();
    repeat(|x: &u32| *x < 3, counting_inc(calls.clone())).start(0, cb);
    assert_eq!(calls.get(), 3);
    assert_eq!(*log.borrow(), vec![Ok(3)]);
}

#[test]
fn repeat_from_five_runs_no_round() {
    let calls = Rc::new(Cell::new(0));
    let (log, cb) = collect();
    repeat(|x: &u32| *x < 3, counting_inc(calls.clone())).start(5, cb);
    assert_eq!(calls.get(), 0);
    assert_eq!(*log.borrow(), vec![Ok(5)]);
}

#[test]
fn chained_sums_constant_until_ten() {
    let rounds = Rc::new(Cell::new(0));
    let r = rounds.clone();
    let three = TaskFn::rc("three", move |ctx: CancellationToken, acc: u32, done: Callback<u32>| {
        r.set(r.get() + 1);
        constant(3u32).run(ctx, acc, done);
    });

    let (log, cb) = collect();
    chained()
        .continuer(|acc: &u32| *acc < 10)
        .aggregator(|a: &u32, b: u32| a + b)
        .build()
        .expect("complete config")
        .over(three)
        .start(0, cb);

    assert_eq!(rounds.get(), 4);
    assert_eq!(*log.borrow(), vec![Ok(12)]);
}

#[test]
fn record_maps_each_key() {
    let mut tasks: BTreeMap<String, TaskRef<Value, Value>> = BTreeMap::new();
    tasks.insert(
        "a".into(),
        unary(|v: Value| v.as_i64().map(|x| json!(x + 1)).ok_or("nan")).into_ref(),
    );
    tasks.insert(
        "b".into(),
        unary(|v: Value| v.as_i64().map(|x| json!(x * 2)).ok_or("nan")).into_ref(),
    );
    let task = record(InlineEngine::new(), Options::default(), tasks);

    let full: BTreeMap<String, Value> = [("a".into(), json!(1)), ("b".into(), json!(2))].into_iter().collect();
    let (log, cb) = collect();
    task.start(full, cb);
    let expected: BTreeMap<String, Value> = [("a".into(), json!(2)), ("b".into(), json!(4))].into_iter().collect();
    assert_eq!(*log.borrow(), vec![Ok(expected)]);

    let partial: BTreeMap<String, Value> = [("a".into(), json!(1))].into_iter().collect();
    let (log, cb) = collect();
    task.start(partial, cb);
    let expected: BTreeMap<String, Value> = [("a".into(), json!(2)), ("b".into(), json!({}))].into_iter().collect();
    assert_eq!(*log.borrow(), vec![Ok(expected)]);
}

#[test]
fn wait_succeeds_within_one_tick() {
    let clock = ManualClock::new();
    let (log, cb) = collect();
    wait()
        .predicate(|| true)
        .interval(Duration::from_millis(10))
        .timers(clock.clone())
        .value("done")
        .build()
        .expect("valid")
        .start(None, cb);

    clock.advance(Duration::from_millis(10));
    assert_eq!(*log.borrow(), vec![Ok("done")]);
}

#[test]
fn wait_times_out_at_the_deadline() {
    let clock = ManualClock::new();
    let (log, cb) = collect::<()>();
    wait()
        .predicate(|| false)
        .interval(Duration::from_millis(10))
        .timeout(Duration::from_millis(30))
        .timers(clock.clone())
        .value(())
        .build()
        .expect("valid")
        .start(None, cb);

    clock.advance(Duration::from_millis(29));
    assert!(log.borrow().is_empty());
    clock.advance(Duration::from_millis(1));
    assert_eq!(*log.borrow(), vec![Err(TaskError::Timeout)]);
}

#[test]
fn cancel_is_idempotent_and_no_op_after_settlement() {
    let clock = ManualClock::new();
    let (log, cb) = collect::<()>();
    let handle = wait()
        .predicate(|| true)
        .interval(Duration::from_millis(10))
        .timers(clock.clone())
        .value(())
        .build()
        .expect("valid")
        .start(None, cb);

    clock.advance(Duration::from_millis(10));
    handle.cancel();
    handle.cancel();
    clock.advance(Duration::from_millis(100));
    assert_eq!(*log.borrow(), vec![Ok(())]);

    let (log, cb) = collect::<u32>();
    let parked: Rc<RefCell<Option<Callback<u32>>>> = Rc::new(RefCell::new(None));
    let p = parked.clone();
    let slow = TaskFn::rc("slow", move |_ctx: CancellationToken, _: u32, done: Callback<u32>| {
        *p.borrow_mut() = Some(done);
    });
    let handle = repeat(|_: &u32| true, slow).start(0, cb);
    handle.cancel();
    handle.cancel();
    if let Some(done) = parked.borrow_mut().take() {
        done.succeed(1);
    }
    assert!(log.borrow().is_empty());
}

#[test]
fn failures_short_circuit_iteration_with_the_same_reason() {
    let flaky = |limit: u32| {
        unary(move |n: u32| {
            if n >= limit {
                Err(format!("gave up at {n}"))
            } else {
                Ok(n + 1)
            }
        })
    };

    let (log, cb) = collect();
    repeat(|_: &u32| true, flaky(4)).start(0, cb);
    assert_eq!(*log.borrow(), vec![Err(TaskError::fail("gave up at 4"))]);

    let (log, cb) = collect();
    chained()
        .continuer(|_: &u32| true)
        .aggregator(|_: &u32, b: u32| b)
        .build()
        .expect("complete config")
        .over(flaky(2))
        .start(0, cb);
    assert_eq!(*log.borrow(), vec![Err(TaskError::fail("gave up at 2"))]);
}
