//! # Fan-out over dynamic JSON input.
//!
//! The typed adapters take `Vec` and `BTreeMap` inputs, so a malformed outer
//! input cannot reach them. The variants here accept any
//! [`serde_json::Value`] and check its shape first. A wrong shape fails the
//! activation with a fixed diagnostic and nothing is submitted:
//!
//! | adapter                                   | expects  | otherwise                 |
//! |-------------------------------------------|----------|---------------------------|
//! | `applied_race/parallel/fallback`, `indexed` | array  | `"Input is not an array"` |
//! | `applied_parallel_object`, `record`       | object   | `"Invalid input object"`  |
//!
//! Collections of outputs come back as JSON arrays and objects.

use std::collections::BTreeMap;
use std::convert::identity;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::Options;
use crate::engine::Engine;
use crate::error::TaskError;
use crate::{Callback, Task, TaskExt, TaskRef};

/// Diagnostic for a non-array input.
pub const NOT_AN_ARRAY: &str = "Input is not an array";
/// Diagnostic for a non-object input.
pub const NOT_AN_OBJECT: &str = "Invalid input object";

/// Task accepting only JSON arrays.
pub struct FromArray<R> {
    name: &'static str,
    inner: TaskRef<Vec<Value>, R>,
    wrap: fn(R) -> Value,
}

impl<R: 'static> Task<Value, Value> for FromArray<R> {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, ctx: CancellationToken, input: Value, done: Callback<Value>) {
        match input {
            Value::Array(items) => self.inner.run(ctx, items, done.map_input(self.wrap)),
            _ => done.guarded(&ctx).fail(TaskError::InvalidInput {
                reason: NOT_AN_ARRAY,
            }),
        }
    }
}

/// Task accepting only JSON objects.
pub struct FromObject {
    name: &'static str,
    inner: TaskRef<BTreeMap<String, Value>, BTreeMap<String, Value>>,
}

impl Task<Value, Value> for FromObject {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, ctx: CancellationToken, input: Value, done: Callback<Value>) {
        match input {
            Value::Object(map) => self.inner.run(
                ctx,
                map.into_iter().collect(),
                done.map_input(|out: BTreeMap<String, Value>| Value::Object(out.into_iter().collect())),
            ),
            _ => done.guarded(&ctx).fail(TaskError::InvalidInput {
                reason: NOT_AN_OBJECT,
            }),
        }
    }
}

/// [`applied_race`](crate::applied_race) over a JSON array.
pub fn applied_race<E>(engine: E, opts: Options, task: impl Task<Value, Value>) -> FromArray<Value>
where
    E: Engine + 'static,
{
    FromArray {
        name: "applied_race",
        inner: crate::applied_race(engine, opts, task).into_ref(),
        wrap: identity,
    }
}

/// [`applied_parallel`](crate::applied_parallel) over a JSON array.
///
/// ```
/// use serde_json::{json, Value};
/// use requestors::{json, unary, Callback, InlineEngine, Options, TaskExt};
///
/// let len = unary(|v: Value| Ok::<_, String>(json!(v.to_string().len())));
/// let task = json::applied_parallel(InlineEngine::new(), Options::default(), len);
///
/// task.start(json!(["a", 10]), Callback::new(|o| assert_eq!(o, Ok(json!([3, 2])))));
/// task.start(json!({"a": 1}), Callback::new(|o: Result<Value, _>| {
///     assert_eq!(o.unwrap_err().to_string(), "Input is not an array");
/// }));
/// ```
pub fn applied_parallel<E>(
    engine: E,
    opts: Options,
    task: impl Task<Value, Value>,
) -> FromArray<Vec<Value>>
where
    E: Engine + 'static,
{
    FromArray {
        name: "applied_parallel",
        inner: crate::applied_parallel(engine, opts, task).into_ref(),
        wrap: Value::Array,
    }
}

/// [`applied_fallback`](crate::applied_fallback) over a JSON array.
pub fn applied_fallback<E>(
    engine: E,
    opts: Options,
    task: impl Task<Value, Value>,
) -> FromArray<Value>
where
    E: Engine + 'static,
{
    FromArray {
        name: "applied_fallback",
        inner: crate::applied_fallback(engine, opts, task).into_ref(),
        wrap: identity,
    }
}

/// [`applied_parallel_object`](crate::applied_parallel_object) over a JSON object.
pub fn applied_parallel_object<E>(engine: E, opts: Options, task: impl Task<Value, Value>) -> FromObject
where
    E: Engine + 'static,
{
    FromObject {
        name: "applied_parallel_object",
        inner: crate::applied_parallel_object(engine, opts, task).into_ref(),
    }
}

/// [`indexed`](crate::indexed) over a JSON array; missing positions report `{}`.
pub fn indexed<E>(engine: E, opts: Options, tasks: Vec<TaskRef<Value, Value>>) -> FromArray<Vec<Value>>
where
    E: Engine + 'static,
{
    FromArray {
        name: "indexed",
        inner: crate::indexed(engine, opts, tasks).into_ref(),
        wrap: Value::Array,
    }
}

/// [`record`](crate::record) over a JSON object; missing keys report `{}`.
pub fn record<E>(engine: E, opts: Options, tasks: BTreeMap<String, TaskRef<Value, Value>>) -> FromObject
where
    E: Engine + 'static,
{
    FromObject {
        name: "record",
        inner: crate::record(engine, opts, tasks).into_ref(),
    }
}
