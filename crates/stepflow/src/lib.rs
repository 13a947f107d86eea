//! # Step Flow Engine
//!
//! An embeddable engine for long-running, externally checkpointed workflows.
//!
//! ## Features
//!
//! - **Composable items**: sequences, activities, conditional gates, retries,
//!   repeat-until loops and polling waits, plus caller-defined items
//! - **Flat compilation**: an item tree compiles once into an immutable table
//!   keyed by event, so loops are table entries rather than recursion
//! - **Resumable execution**: the whole runtime state is a small serializable
//!   [`State`]; each `apply` call advances it by one caller-visible step
//! - **No runtime of its own**: no spawned tasks, timers or locks; the caller
//!   decides when to call again and where the state lives
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Item tree                              │
//! │  (Steps, Func, Case, LoopUntil, Retry, WaitFor, Custom)      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ compile (once)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    TransitionTable                           │
//! │  (source event -> static / dynamic transitions)              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ apply (per call)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        StepFlow                              │
//! │  (follows static edges, stops after one exclusive edge)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use stepflow::prelude::*;
//!
//! let flow = Steps::new()
//!     .step("provision", |ctx: AppContext| async move { ctx.provision().await })
//!     .wait_for("ready", |ctx: AppContext| async move { ctx.is_ready().await })
//!     .compile("deploy")?;
//!
//! let mut state = State::new();
//! while !flow.is_completed(&state) {
//!     state = flow.apply(&ctx, &state).await?;
//!     tokio::time::sleep(poll_interval).await;
//! }
//! ```

pub mod activity;
pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod item;
pub mod transition;
pub mod workflow;

/// Prelude for common imports
pub mod prelude {
    pub use crate::activity::{Activity, Condition, ErrorHandler, FlowContext};
    pub use crate::builder::Steps;
    pub use crate::config::{IterationLimitPolicy, StepFlowConfig};
    pub use crate::engine::{StepFlow, TransitionDescriptor};
    pub use crate::error::StepFlowError;
    pub use crate::item::{
        CaseItem, FuncItem, Item, LoopUntilItem, RetryItem, StepFlowItem, StepsItem, WaitForItem,
    };
    pub use crate::workflow::{Event, Scope, State};
}

// Re-export key types at crate root
pub use activity::{Activity, Condition, ErrorHandler, FlowContext};
pub use builder::Steps;
pub use config::{IterationLimitPolicy, StepFlowConfig, DEFAULT_MAX_ITERATIONS};
pub use engine::{StepFlow, TransitionDescriptor, TransitionTable};
pub use error::{Result, StepFlowError};
pub use item::{
    CaseItem, Compiled, FuncItem, Item, LoopUntilItem, RetriableTransition, RetryItem,
    StepFlowItem, StepsItem, WaitForItem,
};
pub use transition::{
    BoxedTransition, DynamicTransition, PossibleDestination, StaticTransition, Transition,
};
pub use workflow::{validate_name, Event, EventKind, Scope, State, SCOPE_SEPARATOR};
