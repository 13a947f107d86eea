//! Sequencing item

use std::collections::HashSet;

use super::{Compiled, Item, StepFlowItem};
use crate::activity::FlowContext;
use crate::error::{Result, StepFlowError};
use crate::transition::StaticTransition;
use crate::workflow::{validate_name, Scope};

/// Runs its children one after another
///
/// Compiles to a chain of static transitions:
/// `start(seq) -> start(first)`, `completed(child) -> start(next)` and
/// `completed(last) -> completed(seq)`. An empty sequence links its start
/// straight to its completion. Child names must be unique within the
/// sequence; a repeated name is a compilation error.
pub struct StepsItem<C: FlowContext> {
    name: String,
    items: Vec<Item<C>>,
}

impl<C: FlowContext> StepsItem<C> {
    /// Create a sequence
    pub fn new(name: impl Into<String>, items: Vec<Item<C>>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }

    /// Append a child
    pub fn push(&mut self, item: impl Into<Item<C>>) {
        self.items.push(item.into());
    }

    /// Children, in order
    pub fn items(&self) -> &[Item<C>] {
        &self.items
    }
}

impl<C: FlowContext> Clone for StepsItem<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            items: self.items.clone(),
        }
    }
}

impl<C: FlowContext> StepFlowItem<C> for StepsItem<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn transitions(&self, parent: Option<&Scope>) -> Result<Compiled<C>> {
        validate_name(&self.name)?;
        let scope = Scope::new(self.name.as_str(), parent);

        let mut seen_names = HashSet::new();
        let mut last_event = scope.start();
        let mut transitions = Vec::new();

        for item in &self.items {
            let child = item.transitions(Some(&scope))?;

            if !seen_names.insert(child.scope.name().to_string()) {
                return Err(StepFlowError::DuplicateName {
                    scope: scope.path().to_string(),
                    name: child.scope.name().to_string(),
                });
            }

            transitions.push(StaticTransition::boxed(last_event, child.scope.start()));
            transitions.extend(child.transitions);
            last_event = child.scope.completed();
        }

        transitions.push(StaticTransition::boxed(last_event, scope.completed()));

        Ok(Compiled::new(scope, transitions))
    }
}
