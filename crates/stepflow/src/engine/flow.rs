//! Step flow driver
//!
//! `StepFlow` is responsible for:
//! - Compiling a root item into a [`TransitionTable`]
//! - Advancing a persisted state by one exclusive step per `apply` call
//! - Detecting completion of the root scope

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::activity::FlowContext;
use crate::config::{IterationLimitPolicy, StepFlowConfig};
use crate::error::{Result, StepFlowError};
use crate::item::{Item, StepFlowItem};
use crate::workflow::{Event, Scope, State};

use super::describe::{self, TransitionDescriptor};
use super::table::TransitionTable;

/// A compiled, resumable workflow
///
/// The flow is immutable after compilation. Cloning is cheap and clones
/// share the transition table, so one compiled flow can drive any number
/// of workflow instances. The caller must keep at most one `apply` call in
/// flight per persisted state.
///
/// # Example
///
/// ```ignore
/// use stepflow::prelude::*;
///
/// let flow = StepFlow::compile(
///     Steps::new()
///         .step("provision", |ctx: AppContext| async move { ctx.provision().await })
///         .wait_for("ready", |ctx: AppContext| async move { ctx.is_ready().await })
///         .build("deploy"),
/// )?;
///
/// let mut state = store.load(instance_id).await?;
/// state = flow.apply(&ctx, &state).await?;
/// store.save(instance_id, &state).await?;
/// ```
pub struct StepFlow<C: FlowContext> {
    scope: Scope,
    start: Event,
    completed: Event,
    completed_id: String,
    table: Arc<TransitionTable<C>>,
    config: StepFlowConfig,
}

impl<C: FlowContext> StepFlow<C> {
    /// Compile a root item with the default configuration
    pub fn compile(item: impl Into<Item<C>>) -> Result<Self> {
        Self::with_config(item, StepFlowConfig::default())
    }

    /// Compile a root item with an explicit configuration
    pub fn with_config(item: impl Into<Item<C>>, config: StepFlowConfig) -> Result<Self> {
        let compiled = item.into().transitions(None)?;
        let table = TransitionTable::new(compiled.transitions);

        info!(
            flow = %compiled.scope,
            transitions = table.len(),
            max_iterations = config.max_iterations,
            "compiled step flow"
        );

        let start = compiled.scope.start();
        let completed = compiled.scope.completed();

        Ok(Self {
            completed_id: completed.id(),
            scope: compiled.scope,
            start,
            completed,
            table: Arc::new(table),
            config,
        })
    }

    /// Root scope
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Event substituted for an empty state
    pub fn start_event(&self) -> &Event {
        &self.start
    }

    /// Event marking completion of the whole flow
    pub fn completed_event(&self) -> &Event {
        &self.completed
    }

    /// Active configuration
    pub fn config(&self) -> &StepFlowConfig {
        &self.config
    }

    /// Compiled transition table
    pub fn table(&self) -> &TransitionTable<C> {
        &self.table
    }

    /// Whether `state` is exactly the root-completed event
    pub fn is_completed(&self, state: &State) -> bool {
        state.len() == 1 && state.events()[0] == self.completed_id
    }

    /// Advance `state` until an exclusive transition fires or the flow completes
    ///
    /// An empty state starts the flow. Static transitions are followed
    /// without returning; the first exclusive transition ends the call. A
    /// completed state is returned unchanged without invoking anything.
    ///
    /// On error nothing is returned but the error: the caller keeps its
    /// pre-call state and may re-submit it.
    #[instrument(skip(self, ctx, state), fields(flow = %self.scope, state = %state))]
    pub async fn apply(&self, ctx: &C, state: &State) -> Result<State> {
        let mut frontier = if state.is_empty() {
            State::from(self.start.clone())
        } else {
            state.clone()
        };

        // Within one call only static transitions are followed, so any
        // repeated frontier is a static cycle
        let mut seen = HashSet::new();
        seen.insert(frontier.clone());

        let max_iterations = self.config.max_iterations.max(1);
        for _ in 0..max_iterations {
            if self.is_completed(&frontier) {
                return Ok(frontier);
            }

            let transition = self
                .table
                .lookup(&frontier)
                .ok_or_else(|| StepFlowError::UnhandledState(frontier.clone()))?;

            let destination = transition
                .destination(ctx)
                .await
                .map_err(StepFlowError::Callable)?;

            let next: State = destination.into_iter().collect();
            debug!(
                source = %transition.source(),
                destination = %next,
                exclusive = transition.is_exclusive(),
                "applied transition"
            );

            if transition.is_exclusive() {
                return Ok(next);
            }

            if !seen.insert(next.clone()) {
                return Err(StepFlowError::StaticCycle(next));
            }
            frontier = next;
        }

        if self.is_completed(&frontier) {
            return Ok(frontier);
        }

        match self.config.on_iteration_limit {
            IterationLimitPolicy::Yield => {
                warn!(
                    max_iterations,
                    state = %frontier,
                    "iteration limit reached, yielding progressed state"
                );
                Ok(frontier)
            }
            IterationLimitPolicy::Fail => Err(StepFlowError::IterationLimit(max_iterations)),
        }
    }

    /// Transition table rows in compilation order
    pub fn describe(&self) -> Vec<TransitionDescriptor> {
        self.table.iter().map(|t| TransitionDescriptor::from(&**t)).collect()
    }

    /// Render the transition table as a Mermaid flowchart
    pub fn to_mermaid(&self) -> String {
        describe::render_mermaid(&self.describe())
    }
}

impl<C: FlowContext> Clone for StepFlow<C> {
    fn clone(&self) -> Self {
        Self {
            scope: self.scope.clone(),
            start: self.start.clone(),
            completed: self.completed.clone(),
            completed_id: self.completed_id.clone(),
            table: self.table.clone(),
            config: self.config.clone(),
        }
    }
}

impl<C: FlowContext> fmt::Debug for StepFlow<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepFlow")
            .field("scope", &self.scope.path())
            .field("transitions", &self.table.len())
            .field("config", &self.config)
            .finish()
    }
}
