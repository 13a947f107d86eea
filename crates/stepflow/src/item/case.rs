//! Conditional gate

use std::future::Future;
use std::sync::Arc;

use super::{Compiled, Item, StepFlowItem};
use crate::activity::{Condition, FlowContext};
use crate::error::Result;
use crate::transition::{DynamicTransition, PossibleDestination, StaticTransition};
use crate::workflow::{validate_name, Scope};

/// Runs its child only when a predicate holds
///
/// `start(case)` evaluates the predicate: `true` starts the child, `false`
/// completes the case without ever starting it. The child's completion
/// completes the case.
pub struct CaseItem<C: FlowContext> {
    name: String,
    item: Box<Item<C>>,
    condition: Arc<dyn Condition<C>>,
}

impl<C: FlowContext> CaseItem<C> {
    /// Create a gate from an async predicate
    pub fn new<F, Fut>(name: impl Into<String>, item: impl Into<Item<C>>, condition: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        Self::with_condition(name, item, Arc::new(condition))
    }

    /// Create a gate from a [`Condition`] implementation
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

impl<C: FlowContext> Clone for CaseItem<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            item: self.item.clone(),
            condition: self.condition.clone(),
        }
    }
}

impl<C: FlowContext> StepFlowItem<C> for CaseItem<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn transitions(&self, parent: Option<&Scope>) -> Result<Compiled<C>> {
        validate_name(&self.name)?;
        let scope = Scope::new(self.name.as_str(), parent);
        let child = self.item.transitions(Some(&scope))?;

        let condition = self.condition.clone();
        let child_start = child.scope.start();
        let skipped = scope.completed();
        let gate = DynamicTransition::new(
            scope.start(),
            move |ctx: C| {
                let condition = condition.clone();
                let child_start = child_start.clone();
                let skipped = skipped.clone();
                async move {
                    if condition.evaluate(&ctx).await? {
                        Ok(vec![child_start])
                    } else {
                        Ok(vec![skipped])
                    }
                }
            },
            vec![
                PossibleDestination::new(child.scope.start(), "case condition is met"),
                PossibleDestination::new(scope.completed(), "case condition is not met"),
            ],
        );

        let mut transitions = vec![
            gate.boxed(),
            StaticTransition::boxed(child.scope.completed(), scope.completed()),
        ];
        transitions.extend(child.transitions);

        Ok(Compiled::new(scope, transitions))
    }
}
