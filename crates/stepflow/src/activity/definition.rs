//! Callable traits invoked by dynamic transitions

use std::future::Future;

use async_trait::async_trait;

/// Execution context passed to every callable
///
/// The engine never inspects the context. It borrows it for one `apply`
/// call and hands each callable an owned clone, so cheap clones (handles,
/// `Arc`s) are expected. Cancellation is whatever the caller puts in here.
pub trait FlowContext: Clone + Send + Sync + 'static {}

impl<T> FlowContext for T where T: Clone + Send + Sync + 'static {}

/// A unit of work run when a [`FuncItem`](crate::FuncItem) starts
///
/// # Example
///
/// ```ignore
/// struct Provision;
///
/// #[async_trait]
/// impl Activity<AppContext> for Provision {
///     async fn execute(&self, ctx: &AppContext) -> anyhow::Result<()> {
///         ctx.cloud.create_instance().await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Activity<C: FlowContext>: Send + Sync {
    /// Run the activity; an error fails the transition
    async fn execute(&self, ctx: &C) -> anyhow::Result<()>;
}

/// A predicate evaluated by case, loop-until and wait-for items
#[async_trait]
pub trait Condition<C: FlowContext>: Send + Sync {
    /// Evaluate the predicate
    async fn evaluate(&self, ctx: &C) -> anyhow::Result<bool>;
}

/// Decides whether a failure inside a [`RetryItem`](crate::RetryItem) is retried
///
/// Returning `Ok(true)` restarts the wrapped item from its beginning,
/// `Ok(false)` propagates the original error. An `Err` replaces the original
/// error.
#[async_trait]
pub trait ErrorHandler<C: FlowContext>: Send + Sync {
    /// Handle an error raised by the wrapped item
    async fn handle(&self, ctx: &C, err: &anyhow::Error) -> anyhow::Result<bool>;
}

#[async_trait]
impl<C, F, Fut> Activity<C> for F
where
    C: FlowContext,
    F: Fn(C) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn execute(&self, ctx: &C) -> anyhow::Result<()> {
        (self)(ctx.clone()).await
    }
}

#[async_trait]
impl<C, F, Fut> Condition<C> for F
where
    C: FlowContext,
    F: Fn(C) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
{
    async fn evaluate(&self, ctx: &C) -> anyhow::Result<bool> {
        (self)(ctx.clone()).await
    }
}

#[async_trait]
impl<C, F, Fut> ErrorHandler<C> for F
where
    C: FlowContext,
    F: Fn(C, &anyhow::Error) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
{
    async fn handle(&self, ctx: &C, err: &anyhow::Error) -> anyhow::Result<bool> {
        (self)(ctx.clone(), err).await
    }
}
