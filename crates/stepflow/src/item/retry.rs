//! Error-recovery wrapper
//!
//! A retry item adds no scope and no events of its own. It wraps every
//! transition of its child, so a failure anywhere inside the child (any
//! activity, any predicate, at any depth) goes through the error handler.
//! A retry always restarts the child from its own start event; it never
//! resumes at the failing sub-step.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{Compiled, Item, StepFlowItem};
use crate::activity::{ErrorHandler, FlowContext};
use crate::error::Result;
use crate::transition::{BoxedTransition, PossibleDestination, Transition};
use crate::workflow::{Event, Scope};

/// Transition decorated with retry behavior
///
/// On success the wrapped destination passes through unchanged. On error
/// the handler decides: retry leads to `retry_event`, no retry propagates
/// the original error, and a handler error replaces the original error.
pub struct RetriableTransition<C: FlowContext> {
    transition: BoxedTransition<C>,
    handler: Arc<dyn ErrorHandler<C>>,
    retry_event: Event,
}

impl<C: FlowContext> RetriableTransition<C> {
    /// Wrap `transition`, restarting at `retry_event` when the handler asks
    pub fn new(
        transition: BoxedTransition<C>,
        handler: Arc<dyn ErrorHandler<C>>,
        retry_event: Event,
    ) -> Self {
        Self {
            transition,
            handler,
            retry_event,
        }
    }
}

#[async_trait]
impl<C: FlowContext> Transition<C> for RetriableTransition<C> {
    fn source(&self) -> &Event {
        self.transition.source()
    }

    async fn destination(&self, ctx: &C) -> anyhow::Result<Vec<Event>> {
        let err = match self.transition.destination(ctx).await {
            Ok(events) => return Ok(events),
            Err(err) => err,
        };

        if self.handler.handle(ctx, &err).await? {
            debug!(
                source = %self.transition.source(),
                retry = %self.retry_event,
                error = %err,
                "retrying after error"
            );
            Ok(vec![self.retry_event.clone()])
        } else {
            Err(err)
        }
    }

    fn is_exclusive(&self) -> bool {
        self.transition.is_exclusive()
    }

    fn possible_destinations(&self) -> Vec<PossibleDestination> {
        let mut destinations = self.transition.possible_destinations();
        destinations.push(PossibleDestination::new(self.retry_event.clone(), "retry"));
        destinations
    }
}

/// Retries its child from the beginning whenever the handler says so
pub struct RetryItem<C: FlowContext> {
    item: Box<Item<C>>,
    handler: Arc<dyn ErrorHandler<C>>,
}

impl<C: FlowContext> RetryItem<C> {
    /// Wrap `item` with an async error handler
    pub fn new<F, Fut>(item: impl Into<Item<C>>, handler: F) -> Self
    where
        F: Fn(C, &anyhow::Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        Self::with_handler(item, Arc::new(handler))
    }

    /// Wrap `item` with an [`ErrorHandler`] implementation
    pub fn with_handler(item: impl Into<Item<C>>, handler: Arc<dyn ErrorHandler<C>>) -> Self {
        Self {
            item: Box::new(item.into()),
            handler,
        }
    }
}

impl<C: FlowContext> Clone for RetryItem<C> {
    fn clone(&self) -> Self {
        Self {
            item: self.item.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl<C: FlowContext> StepFlowItem<C> for RetryItem<C> {
    fn name(&self) -> &str {
        self.item.name()
    }

    fn transitions(&self, parent: Option<&Scope>) -> Result<Compiled<C>> {
        let child = self.item.transitions(parent)?;
        let retry_event = child.scope.start();

        let transitions = child
            .transitions
            .into_iter()
            .map(|transition| {
                Arc::new(RetriableTransition::new(
                    transition,
                    self.handler.clone(),
                    retry_event.clone(),
                )) as BoxedTransition<C>
            })
            .collect();

        Ok(Compiled::new(child.scope, transitions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{FuncItem, StepsItem};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn failing() -> FuncItem<()> {
        FuncItem::new("child", |_ctx: ()| async { Err(anyhow::anyhow!("test error")) })
    }

    #[test]
    fn test_wraps_every_child_transition() {
        let seq = StepsItem::new(
            "seq",
            vec![
                FuncItem::new("a", |_ctx: ()| async { Ok(()) }).into(),
                failing().into(),
            ],
        );
        let item = RetryItem::new(seq, |_ctx: (), _err: &anyhow::Error| async { Ok(true) });

        assert_eq!(item.name(), "seq");

        let compiled = item.transitions(None).unwrap();
        assert_eq!(compiled.scope.path(), "seq");
        assert_eq!(compiled.transitions.len(), 5);

        for t in &compiled.transitions {
            let last = t.possible_destinations().pop().unwrap();
            assert_eq!(last.reason, "retry");
            assert_eq!(last.event.id(), "start:seq");
        }
    }

    #[tokio::test]
    async fn test_retry_restarts_child() {
        let item = RetryItem::new(failing(), |_ctx: (), _err: &anyhow::Error| async { Ok(true) });
        let compiled = item.transitions(None).unwrap();

        let t = &compiled.transitions[0];
        assert!(t.is_exclusive());
        assert_eq!(t.destination(&()).await.unwrap(), vec![compiled.scope.start()]);
    }

    #[tokio::test]
    async fn test_no_retry_keeps_original_error() {
        let item = RetryItem::new(failing(), |_ctx: (), _err: &anyhow::Error| async { Ok(false) });
        let compiled = item.transitions(None).unwrap();

        let err = compiled.transitions[0].destination(&()).await.unwrap_err();
        assert_eq!(err.to_string(), "test error");
    }

    #[tokio::test]
    async fn test_handler_error_replaces_original() {
        let item = RetryItem::new(failing(), |_ctx: (), _err: &anyhow::Error| async {
            Err(anyhow::anyhow!("handler error"))
        });
        let compiled = item.transitions(None).unwrap();

        let err = compiled.transitions[0].destination(&()).await.unwrap_err();
        assert_eq!(err.to_string(), "handler error");
    }

    #[tokio::test]
    async fn test_handler_not_called_on_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let ok = FuncItem::new("child", |_ctx: ()| async { Ok(()) });
        let item = RetryItem::new(ok, {
            let calls = calls.clone();
            move |_ctx: (), _err: &anyhow::Error| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(true) }
            }
        });

        let compiled = item.transitions(None).unwrap();
        let dest = compiled.transitions[0].destination(&()).await.unwrap();

        assert_eq!(dest, vec![compiled.scope.completed()]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
