//! Flat transition index keyed by source event

use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use crate::activity::FlowContext;
use crate::transition::BoxedTransition;
use crate::workflow::State;

/// Compiled transition table
///
/// Maps every serialized source event to its candidate transitions. The
/// table is built once and never mutated, so one table can serve any
/// number of workflow instances concurrently.
pub struct TransitionTable<C: FlowContext> {
    index: HashMap<String, Vec<BoxedTransition<C>>>,
    ordered: Vec<BoxedTransition<C>>,
}

impl<C: FlowContext> TransitionTable<C> {
    /// Index a compiled transition list
    ///
    /// Transitions sharing a source are kept in compilation order; lookups
    /// return the first one.
    pub fn new(transitions: Vec<BoxedTransition<C>>) -> Self {
        let mut index: HashMap<String, Vec<BoxedTransition<C>>> = HashMap::new();

        for transition in &transitions {
            let candidates = index.entry(transition.source().id()).or_default();
            if !candidates.is_empty() {
                warn!(
                    source = %transition.source(),
                    "duplicate transition source, keeping the first"
                );
            }
            candidates.push(transition.clone());
        }

        Self {
            index,
            ordered: transitions,
        }
    }

    /// First transition whose source is `event_id`
    pub fn get(&self, event_id: &str) -> Option<&BoxedTransition<C>> {
        self.index.get(event_id).and_then(|candidates| candidates.first())
    }

    /// Every transition registered for `event_id`, in compilation order
    pub fn candidates(&self, event_id: &str) -> &[BoxedTransition<C>] {
        self.index.get(event_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Transition for the first frontier event that has one
    pub fn lookup(&self, state: &State) -> Option<&BoxedTransition<C>> {
        state.iter().find_map(|event_id| self.get(event_id))
    }

    /// Number of transitions
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// All transitions in compilation order
    pub fn iter(&self) -> impl Iterator<Item = &BoxedTransition<C>> {
        self.ordered.iter()
    }
}

impl<C: FlowContext> fmt::Debug for TransitionTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionTable")
            .field(
                "sources",
                &self.ordered.iter().map(|t| t.source().id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::StaticTransition;
    use crate::workflow::Scope;

    fn scopes() -> (Scope, Scope, Scope) {
        let root = Scope::root("flow");
        let a = Scope::new("a", Some(&root));
        let b = Scope::new("b", Some(&root));
        (root, a, b)
    }

    #[test]
    fn test_lookup_uses_first_matching_frontier_event() {
        let (root, a, b) = scopes();
        let table: TransitionTable<()> = TransitionTable::new(vec![
            StaticTransition::boxed(root.start(), a.start()),
            StaticTransition::boxed(a.completed(), b.start()),
        ]);

        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());

        let state: State = vec![b.start(), a.completed(), root.start()]
            .into_iter()
            .collect();
        let found = table.lookup(&state).unwrap();
        assert_eq!(found.source(), &a.completed());

        assert!(table.lookup(&State::from(b.completed())).is_none());
    }

    #[test]
    fn test_duplicate_sources_keep_compilation_order() {
        let (root, a, b) = scopes();
        let table: TransitionTable<()> = TransitionTable::new(vec![
            StaticTransition::boxed(root.start(), a.start()),
            StaticTransition::boxed(root.start(), b.start()),
        ]);

        let id = root.start().id();
        assert_eq!(table.candidates(&id).len(), 2);
        assert_eq!(
            table.get(&id).unwrap().possible_destinations()[0].event,
            a.start()
        );
        assert!(table.candidates("start:missing").is_empty());
    }
}
