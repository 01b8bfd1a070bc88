//! Empty-record placeholders for missing fan-out slots.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::marker::PhantomData;

use tokio_util::sync::CancellationToken;

use crate::{Callback, Task};

/// Output types with an "empty record" value.
///
/// [`indexed`](crate::indexed) and [`record`](crate::record) report it for
/// slots the input does not provide.
pub trait EmptyRecord {
    /// The empty record.
    fn empty_record() -> Self;
}

impl EmptyRecord for serde_json::Value {
    /// `{}`
    fn empty_record() -> Self {
        serde_json::Value::Object(serde_json::Map::new())
    }
}

impl<K: Ord, V> EmptyRecord for BTreeMap<K, V> {
    fn empty_record() -> Self {
        BTreeMap::new()
    }
}

impl<K, V, S: BuildHasher + Default> EmptyRecord for HashMap<K, V, S> {
    fn empty_record() -> Self {
        HashMap::default()
    }
}

impl<T> EmptyRecord for Option<T> {
    fn empty_record() -> Self {
        None
    }
}

/// Task reporting [`EmptyRecord::empty_record`], whatever its input.
pub struct Placeholder<O> {
    _out: PhantomData<fn() -> O>,
}

/// Returns a [`Placeholder`] task.
pub fn placeholder<O: EmptyRecord>() -> Placeholder<O> {
    Placeholder { _out: PhantomData }
}

impl<X, O: EmptyRecord + 'static> Task<X, O> for Placeholder<O> {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn run(&self, ctx: CancellationToken, _ignored: X, done: Callback<O>) {
        done.guarded(&ctx).succeed(O::empty_record());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::TaskExt;
    use crate::testing::Probe;

    #[test]
    fn json_placeholder_is_an_empty_object() {
        let probe = Probe::new();
        placeholder::<serde_json::Value>().start(json!([1, 2]), probe.callback());
        assert_eq!(probe.outcomes(), vec![Ok(json!({}))]);
    }

    #[test]
    fn option_placeholder_is_none() {
        assert_eq!(Option::<u8>::empty_record(), None);
        assert!(HashMap::<u8, u8>::empty_record().is_empty());
    }
}
