//! Composable workflow items
//!
//! Every item, compiled against a parent scope, yields its own scope and
//! the flat list of transitions it and its descendants contribute.
//! Compilation is deterministic: the same item and parent always produce
//! the same scope and transition set.

mod case;
mod func;
mod loop_until;
mod retry;
mod steps;
mod wait_for;

use std::sync::Arc;

pub use case::CaseItem;
pub use func::FuncItem;
pub use loop_until::LoopUntilItem;
pub use retry::{RetriableTransition, RetryItem};
pub use steps::StepsItem;
pub use wait_for::WaitForItem;

use crate::activity::FlowContext;
use crate::error::Result;
use crate::transition::BoxedTransition;
use crate::workflow::Scope;

/// Output of compiling one item
pub struct Compiled<C: FlowContext> {
    /// Scope of the compiled item
    pub scope: Scope,

    /// Transitions of the item and all its descendants
    pub transitions: Vec<BoxedTransition<C>>,
}

impl<C: FlowContext> Compiled<C> {
    /// Bundle a scope with its transitions
    pub fn new(scope: Scope, transitions: Vec<BoxedTransition<C>>) -> Self {
        Self { scope, transitions }
    }
}

/// Compilation contract for workflow nodes
///
/// The built-in variants are collected in [`Item`]; any other type
/// implementing this trait can join a tree through [`Item::Custom`]. An
/// implementation must emit each source event at most once and keep the
/// scopes it creates unique under its parent.
pub trait StepFlowItem<C: FlowContext>: Send + Sync {
    /// Leaf name of the scope this item compiles to
    fn name(&self) -> &str;

    /// Compile the item under `parent` (`None` for the root)
    fn transitions(&self, parent: Option<&Scope>) -> Result<Compiled<C>>;
}

/// Any workflow item
pub enum Item<C: FlowContext> {
    /// Single activity
    Func(FuncItem<C>),

    /// Ordered sequence
    Steps(StepsItem<C>),

    /// Conditional gate
    Case(CaseItem<C>),

    /// Repeat until a predicate holds
    LoopUntil(LoopUntilItem<C>),

    /// Error-recovery wrapper
    Retry(RetryItem<C>),

    /// Poll until a predicate holds
    WaitFor(WaitForItem<C>),

    /// Caller-defined item
    Custom(Arc<dyn StepFlowItem<C>>),
}

impl<C: FlowContext> Item<C> {
    /// Wrap a caller-defined item
    pub fn custom(item: impl StepFlowItem<C> + 'static) -> Self {
        Self::Custom(Arc::new(item))
    }

    fn as_dyn(&self) -> &dyn StepFlowItem<C> {
        match self {
            Self::Func(item) => item,
            Self::Steps(item) => item,
            Self::Case(item) => item,
            Self::LoopUntil(item) => item,
            Self::Retry(item) => item,
            Self::WaitFor(item) => item,
            Self::Custom(item) => item.as_ref(),
        }
    }
}

impl<C: FlowContext> StepFlowItem<C> for Item<C> {
    fn name(&self) -> &str {
        self.as_dyn().name()
    }

    fn transitions(&self, parent: Option<&Scope>) -> Result<Compiled<C>> {
        self.as_dyn().transitions(parent)
    }
}

impl<C: FlowContext> Clone for Item<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Func(item) => Self::Func(item.clone()),
            Self::Steps(item) => Self::Steps(item.clone()),
            Self::Case(item) => Self::Case(item.clone()),
            Self::LoopUntil(item) => Self::LoopUntil(item.clone()),
            Self::Retry(item) => Self::Retry(item.clone()),
            Self::WaitFor(item) => Self::WaitFor(item.clone()),
            Self::Custom(item) => Self::Custom(item.clone()),
        }
    }
}

macro_rules! impl_from_item {
    ($($variant:ident => $ty:ident),* $(,)?) => {
        $(
            impl<C: FlowContext> From<$ty<C>> for Item<C> {
                fn from(item: $ty<C>) -> Self {
                    Self::$variant(item)
                }
            }
        )*
    };
}

impl_from_item! {
    Func => FuncItem,
    Steps => StepsItem,
    Case => CaseItem,
    LoopUntil => LoopUntilItem,
    Retry => RetryItem,
    WaitFor => WaitForItem,
}

impl<C: FlowContext> From<Arc<dyn StepFlowItem<C>>> for Item<C> {
    fn from(item: Arc<dyn StepFlowItem<C>>) -> Self {
        Self::Custom(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::StaticTransition;
    use crate::workflow::validate_name;

    /// Two-hop item: start -> mid -> completed, all static
    struct Relay {
        name: String,
    }

    impl StepFlowItem<()> for Relay {
        fn name(&self) -> &str {
            &self.name
        }

        fn transitions(&self, parent: Option<&Scope>) -> Result<Compiled<()>> {
            validate_name(&self.name)?;
            let scope = Scope::new(self.name.as_str(), parent);
            let mid = Scope::new("mid", Some(&scope));
            Ok(Compiled::new(
                scope.clone(),
                vec![
                    StaticTransition::boxed(scope.start(), mid.start()),
                    StaticTransition::boxed(mid.start(), scope.completed()),
                ],
            ))
        }
    }

    #[test]
    fn test_custom_item_dispatch() {
        let item: Item<()> = Item::custom(Relay {
            name: "relay".to_string(),
        });

        assert_eq!(item.name(), "relay");

        let parent = Scope::root("flow");
        let compiled = item.transitions(Some(&parent)).unwrap();
        assert_eq!(compiled.scope.path(), "flow/relay");
        assert_eq!(compiled.transitions.len(), 2);
        assert_eq!(compiled.transitions[1].source().id(), "start:flow/relay/mid");
    }

    #[test]
    fn test_clone_keeps_variant() {
        let item: Item<()> = FuncItem::new("a", |_ctx: ()| async { Ok(()) }).into();
        let cloned = item.clone();
        assert!(matches!(cloned, Item::Func(_)));
        assert_eq!(cloned.name(), "a");
    }
}
