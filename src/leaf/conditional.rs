//! Conditional task: passes its input through when a predicate holds.

use std::fmt::Debug;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::{Callback, Task};

/// Task reporting its input when `predicate(&input)` is true, else a failure.
pub struct Conditional<P> {
    predicate: P,
    message: Option<String>,
}

/// Returns a conditional task with the default diagnostic.
///
/// ```
/// use requestors::{conditional, Callback, TaskExt};
///
/// let positive = conditional(|n: &i32| *n > 0).message("must be positive");
/// positive.start(3, Callback::new(|o| assert_eq!(o, Ok(3))));
/// positive.start(-1, Callback::new(|o: Result<i32, _>| {
///     assert_eq!(o.unwrap_err().to_string(), "must be positive");
/// }));
/// ```
pub fn conditional<T, P>(predicate: P) -> Conditional<P>
where
    P: Fn(&T) -> bool + 'static,
{
    Conditional {
        predicate,
        message: None,
    }
}

impl<P> Conditional<P> {
    /// Replaces the default failure diagnostic.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T, P> Task<T, T> for Conditional<P>
where
    T: Debug + 'static,
    P: Fn(&T) -> bool + 'static,
{
    fn name(&self) -> &str {
        "conditional"
    }

    fn run(&self, ctx: CancellationToken, input: T, done: Callback<T>) {
        let done = done.guarded(&ctx);
        if (self.predicate)(&input) {
            done.succeed(input);
            return;
        }
        let message = match &self.message {
            Some(message) => message.clone(),
            None => format!("conditional: value failed predicate\n{input:?}"),
        };
        done.fail(TaskError::Predicate { message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskExt;
    use crate::testing::Probe;

    #[test]
    fn default_diagnostic_names_the_value() {
        let probe = Probe::new();
        let even = conditional(|n: &u32| n % 2 == 0);
        even.start(4, probe.callback());
        even.start(5, probe.callback());

        assert_eq!(
            probe.outcomes(),
            vec![
                Ok(4),
                Err(TaskError::Predicate {
                    message: "conditional: value failed predicate\n5".into()
                })
            ]
        );
    }
}
