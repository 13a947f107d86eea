//! Poll-until item

use std::future::Future;
use std::sync::Arc;

use super::{Compiled, StepFlowItem};
use crate::activity::{Condition, FlowContext};
use crate::error::Result;
use crate::transition::{DynamicTransition, PossibleDestination};
use crate::workflow::{validate_name, Scope};

/// Completes once a predicate holds
///
/// `start(item)` evaluates the predicate and leads to `completed(item)` or
/// back to itself. The transition is exclusive, so each `apply` call
/// evaluates the predicate once; the caller's re-invocation cadence is the
/// polling interval.
pub struct WaitForItem<C: FlowContext> {
    name: String,
    condition: Arc<dyn Condition<C>>,
}

impl<C: FlowContext> WaitForItem<C> {
    /// Create a wait from an async predicate
    pub fn new<F, Fut>(name: impl Into<String>, condition: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        Self::with_condition(name, Arc::new(condition))
    }

    /// Create a wait from a [`Condition`] implementation
    pub fn with_condition(name: impl Into<String>, condition: Arc<dyn Condition<C>>) -> Self {
        Self {
            name: name.into(),
            condition,
        }
    }
}

impl<C: FlowContext> Clone for WaitForItem<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            condition: self.condition.clone(),
        }
    }
}

impl<C: FlowContext> StepFlowItem<C> for WaitForItem<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn transitions(&self, parent: Option<&Scope>) -> Result<Compiled<C>> {
        validate_name(&self.name)?;
        let scope = Scope::new(self.name.as_str(), parent);

        let condition = self.condition.clone();
        let waiting = scope.start();
        let done = scope.completed();
        let poll = DynamicTransition::new(
            scope.start(),
            move |ctx: C| {
                let condition = condition.clone();
                let waiting = waiting.clone();
                let done = done.clone();
                async move {
                    if condition.evaluate(&ctx).await? {
                        Ok(vec![done])
                    } else {
                        Ok(vec![waiting])
                    }
                }
            },
            vec![
                PossibleDestination::new(scope.start(), "wait condition is not met"),
                PossibleDestination::new(scope.completed(), "wait condition is met"),
            ],
        );

        Ok(Compiled::new(scope, vec![poll.boxed()]))
    }
}
