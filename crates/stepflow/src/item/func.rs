//! Single-activity item

use std::future::Future;
use std::sync::Arc;

use super::{Compiled, StepFlowItem};
use crate::activity::{Activity, FlowContext};
use crate::error::Result;
use crate::transition::{DynamicTransition, PossibleDestination};
use crate::workflow::{validate_name, Scope};

/// Runs one activity when started
///
/// Compiles to a single exclusive transition from `start` that runs the
/// activity and leads to `completed`. An activity error fails the
/// transition and leaves the caller's state where it was.
pub struct FuncItem<C: FlowContext> {
    name: String,
    activity: Arc<dyn Activity<C>>,
}

impl<C: FlowContext> FuncItem<C> {
    /// Create an item from an async closure
    pub fn new<F, Fut>(name: impl Into<String>, activity: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::with_activity(name, Arc::new(activity))
    }

    /// Create an item from an [`Activity`] implementation
    pub fn with_activity(name: impl Into<String>, activity: Arc<dyn Activity<C>>) -> Self {
        Self {
            name: name.into(),
            activity,
        }
    }
}

impl<C: FlowContext> Clone for FuncItem<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            activity: self.activity.clone(),
        }
    }
}

impl<C: FlowContext> StepFlowItem<C> for FuncItem<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn transitions(&self, parent: Option<&Scope>) -> Result<Compiled<C>> {
        validate_name(&self.name)?;
        let scope = Scope::new(self.name.as_str(), parent);

        let activity = self.activity.clone();
        let completed = scope.completed();
        let run = DynamicTransition::new(
            scope.start(),
            move |ctx: C| {
                let activity = activity.clone();
                let completed = completed.clone();
                async move {
                    activity.execute(&ctx).await?;
                    Ok(vec![completed])
                }
            },
            vec![PossibleDestination::new(scope.completed(), "completed")],
        );

        Ok(Compiled::new(scope, vec![run.boxed()]))
    }
}
