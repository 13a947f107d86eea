//! Fluent construction of item trees
//!
//! [`Steps`] collects children in declaration order and turns into a
//! [`StepsItem`] (or straight into a compiled [`StepFlow`]). Nested blocks
//! take another `Steps` as their body:
//!
//! ```ignore
//! let flow = Steps::new()
//!     .step("provision", provision)
//!     .wait_for("ready", is_ready)
//!     .retry("upload", on_upload_error, Steps::new().step("put", put_object))
//!     .loop_until("drain", queue_empty, Steps::new().step("batch", process_batch))
//!     .case("notify", wants_notification, Steps::new().step("send", send_mail))
//!     .compile("deploy")?;
//! ```
//!
//! Case and loop bodies compile to a child sequence named `case` and `loop`
//! respectively. A retry has no scope of its own, so its body sequence
//! carries the retry's name.

use std::future::Future;

use crate::activity::FlowContext;
use crate::engine::StepFlow;
use crate::error::Result;
use crate::item::{CaseItem, FuncItem, Item, LoopUntilItem, RetryItem, StepsItem, WaitForItem};

/// Name of the sequence wrapping a case body
pub const CASE_BODY: &str = "case";

/// Name of the sequence wrapping a loop body
pub const LOOP_BODY: &str = "loop";

/// Ordered list of children under construction
pub struct Steps<C: FlowContext> {
    items: Vec<Item<C>>,
}

impl<C: FlowContext> Default for Steps<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: FlowContext> Steps<C> {
    /// Start an empty sequence
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append an activity
    pub fn step<F, Fut>(mut self, name: impl Into<String>, activity: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.items.push(FuncItem::new(name, activity).into());
        self
    }

    /// Append a poll that completes once `condition` holds
    pub fn wait_for<F, Fut>(mut self, name: impl Into<String>, condition: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.items.push(WaitForItem::new(name, condition).into());
        self
    }

    /// Append a nested sequence
    pub fn steps(mut self, name: impl Into<String>, body: Steps<C>) -> Self {
        self.items.push(body.build(name).into());
        self
    }

    /// Append a sequence restarted from its beginning whenever `handler` says so
    pub fn retry<F, Fut>(mut self, name: impl Into<String>, handler: F, body: Steps<C>) -> Self
    where
        F: Fn(C, &anyhow::Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.items.push(RetryItem::new(body.build(name), handler).into());
        self
    }

    /// Append a body repeated until `condition` holds after an iteration
    pub fn loop_until<F, Fut>(mut self, name: impl Into<String>, condition: F, body: Steps<C>) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.items
            .push(LoopUntilItem::new(name, body.build(LOOP_BODY), condition).into());
        self
    }

    /// Append a body run only when `condition` holds
    pub fn case<F, Fut>(mut self, name: impl Into<String>, condition: F, body: Steps<C>) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.items
            .push(CaseItem::new(name, body.build(CASE_BODY), condition).into());
        self
    }

    /// Append any item, including custom ones
    pub fn item(mut self, item: impl Into<Item<C>>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Number of children so far
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no child was added
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Finish as a named sequence item
    pub fn build(self, name: impl Into<String>) -> StepsItem<C> {
        StepsItem::new(name, self.items)
    }

    /// Finish and compile as the root of a flow
    pub fn compile(self, name: impl Into<String>) -> Result<StepFlow<C>> {
        StepFlow::compile(self.build(name))
    }
}
