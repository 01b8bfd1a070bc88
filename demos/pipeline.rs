//! # Fan-out pipeline with logging
//!
//! Demonstrates:
//! - `applied_parallel`, `record` and `kleisli_sequence` over `InlineEngine`
//! - iteration with `chained`
//! - the `LogWriter` subscriber rendering combinator events via `tracing`
//!
//! Run with `RUST_LOG=debug cargo run --example pipeline --features logging`.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use requestors::{
    Bus, Callback, InlineEngine, LogWriter, Logged, Options, Subscribe, Task, TaskExt, TaskFn, TaskRef,
    applied_parallel, chained, conditional, json, kleisli_sequence, subscribers, unary,
};

fn report<T: std::fmt::Debug + 'static>(label: &'static str) -> Callback<T> {
    Callback::new(move |o| match o {
        Ok(v) => println!("✓ {label}: {v:?}"),
        Err(e) => println!("✗ {label}: {e}"),
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let bus = Bus::new(256);
    let subs: Vec<Rc<dyn Subscribe>> = vec![Rc::new(LogWriter)];
    let listener = subscribers::listen(bus.subscribe(), subs);

    let engine = InlineEngine::new().with_bus(bus.clone());
    let opts = Options::default();

    // One task, many inputs.
    let square = unary(|n: u64| n.checked_mul(n).ok_or("overflow"));
    applied_parallel(engine.clone(), opts, square).start(vec![1, 2, 3, 4], report("squares"));

    // Many tasks, one keyed input; "tags" is missing and gets `{}`.
    let mut fields: BTreeMap<String, TaskRef<Value, Value>> = BTreeMap::new();
    fields.insert(
        "name".into(),
        unary(|v: Value| {
            v.as_str()
                .map(|s| json!(s.to_uppercase()))
                .ok_or("name must be a string")
        })
        .into_ref(),
    );
    fields.insert("tags".into(), unary(|v: Value| Ok::<_, String>(v)).into_ref());
    json::record(engine.clone(), opts, fields).start(json!({"name": "ada"}), report("record"));

    // Validate, then double, logging each step.
    let gate = conditional(|n: &i64| *n > 0).message("must be positive");
    let positive: TaskRef<i64, Logged<Vec<String>, i64>> = TaskFn::rc(
        "positive",
        move |ctx: CancellationToken, n: i64, done: Callback<Logged<Vec<String>, i64>>| {
            let done = done.map_input(|n: i64| Logged::new(vec![format!("{n} is positive")], n));
            gate.run(ctx, n, done);
        },
    );
    let double: TaskRef<i64, Logged<Vec<String>, i64>> =
        unary(|n: i64| Ok::<_, String>(Logged::new(vec![format!("doubled {n}")], n * 2))).into_ref();
    kleisli_sequence(&engine, opts, vec![positive.clone(), double.clone()]).start(21, report("kleisli"));
    kleisli_sequence(&engine, opts, vec![positive, double]).start(-1, report("kleisli"));

    // Sum until the total passes 100.
    chained()
        .continuer(|acc: &u64| *acc <= 100)
        .aggregator(|acc: &u64, n: u64| acc + n)
        .with_bus(bus.clone())
        .build()?
        .over(unary(|acc: u64| Ok::<_, String>(acc / 2 + 7)))
        .start(1, report("chained"));

    drop(engine);
    drop(bus);
    listener.await;
    Ok(())
}
