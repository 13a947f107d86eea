//! Repeat-until item

use std::future::Future;
use std::sync::Arc;

use super::{Compiled, Item, StepFlowItem};
use crate::activity::{Condition, FlowContext};
use crate::error::Result;
use crate::transition::{DynamicTransition, PossibleDestination, StaticTransition};
use crate::workflow::{validate_name, Scope};

/// Runs its child at least once, then again until a predicate holds
///
/// The loop is a cycle in the transition table: `completed(child)`
/// evaluates the predicate and leads either to `completed(loop)` or back to
/// `start(child)`. The child is compiled once and reused by every
/// iteration.
pub struct LoopUntilItem<C: FlowContext> {
    name: String,
    item: Box<Item<C>>,
    condition: Arc<dyn Condition<C>>,
}

impl<C: FlowContext> LoopUntilItem<C> {
    /// Create a loop from an async stop predicate
    pub fn new<F, Fut>(name: impl Into<String>, item: impl Into<Item<C>>, condition: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        Self::with_condition(name, item, Arc::new(condition))
    }

    /// Create a loop from a [`Condition`] implementation
    pub fn with_condition(
        name: impl Into<String>,
        item: impl Into<Item<C>>,
        condition: Arc<dyn Condition<C>>,
    ) -> Self {
        Self {
            name: name.into(),
            item: Box::new(item.into()),
            condition,
        }
    }
}

impl<C: FlowContext> Clone for LoopUntilItem<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            item: self.item.clone(),
            condition: self.condition.clone(),
        }
    }
}

impl<C: FlowContext> StepFlowItem<C> for LoopUntilItem<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn transitions(&self, parent: Option<&Scope>) -> Result<Compiled<C>> {
        validate_name(&self.name)?;
        let scope = Scope::new(self.name.as_str(), parent);
        let child = self.item.transitions(Some(&scope))?;

        let condition = self.condition.clone();
        let again = child.scope.start();
        let done = scope.completed();
        let check = DynamicTransition::new(
            child.scope.completed(),
            move |ctx: C| {
                let condition = condition.clone();
                let again = again.clone();
                let done = done.clone();
                async move {
                    if condition.evaluate(&ctx).await? {
                        Ok(vec![done])
                    } else {
                        Ok(vec![again])
                    }
                }
            },
            vec![
                PossibleDestination::new(child.scope.start(), "loop condition is not met"),
                PossibleDestination::new(scope.completed(), "loop condition is met"),
            ],
        );

        let mut transitions = vec![
            StaticTransition::boxed(scope.start(), child.scope.start()),
            check.boxed(),
        ];
        transitions.extend(child.transitions);

        Ok(Compiled::new(scope, transitions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::FuncItem;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_body_entered_statically() {
        let body = FuncItem::new("body", |_ctx: ()| async { Ok(()) });
        let item = LoopUntilItem::new("loop", body, |_ctx: ()| async { Ok(true) });

        let compiled = item.transitions(None).unwrap();
        let entry = &compiled.transitions[0];
        assert_eq!(entry.source().id(), "start:loop");
        assert!(!entry.is_exclusive());
        assert_eq!(entry.possible_destinations()[0].event.id(), "start:loop/body");

        let check = &compiled.transitions[1];
        assert_eq!(check.source().id(), "completed:loop/body");
        assert!(check.is_exclusive());
    }

    #[tokio::test]
    async fn test_cycle_until_condition() {
        let checks = Arc::new(AtomicUsize::new(0));
        let body = FuncItem::new("body", |_ctx: ()| async { Ok(()) });
        let item = LoopUntilItem::new("loop", body, {
            let checks = checks.clone();
            move |_ctx: ()| {
                let n = checks.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok(n >= 2) }
            }
        });

        let compiled = item.transitions(None).unwrap();
        let check = &compiled.transitions[1];

        assert_eq!(check.destination(&()).await.unwrap()[0].id(), "start:loop/body");
        assert_eq!(check.destination(&()).await.unwrap()[0].id(), "completed:loop");
    }

    #[tokio::test]
    async fn test_condition_error_propagates() {
        let body = FuncItem::new("body", |_ctx: ()| async { Ok(()) });
        let item = LoopUntilItem::new("loop", body, |_ctx: ()| async {
            Err(anyhow::anyhow!("cannot decide"))
        });

        let compiled = item.transitions(None).unwrap();
        let err = compiled.transitions[1].destination(&()).await.unwrap_err();
        assert_eq!(err.to_string(), "cannot decide");
    }
}
