//! Transitions: the edges of a compiled flow
//!
//! A transition leads from one source event to one or more destination
//! events. Static transitions are structural and auto-traversed inside an
//! `apply` call; dynamic transitions run caller code and always hand control
//! back to the caller (they are exclusive).

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::activity::FlowContext;
use crate::workflow::Event;

/// A destination a transition may produce, with the reason it would
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PossibleDestination {
    /// Destination event
    pub event: Event,

    /// Human-readable reason
    pub reason: String,
}

impl PossibleDestination {
    /// Create a possible destination
    pub fn new(event: Event, reason: impl Into<String>) -> Self {
        Self {
            event,
            reason: reason.into(),
        }
    }
}

/// An edge of the state machine
#[async_trait]
pub trait Transition<C: FlowContext>: Send + Sync {
    /// Source event; stable across calls
    fn source(&self) -> &Event;

    /// Compute the destination events, invoking caller code if needed
    async fn destination(&self, ctx: &C) -> anyhow::Result<Vec<Event>>;

    /// Whether taking this transition yields control back to the caller
    fn is_exclusive(&self) -> bool;

    /// Every destination this transition can produce
    fn possible_destinations(&self) -> Vec<PossibleDestination>;
}

/// Shared, type-erased transition
pub type BoxedTransition<C> = Arc<dyn Transition<C>>;

/// Structural edge with a fixed destination
#[derive(Debug, Clone)]
pub struct StaticTransition {
    source: Event,
    destination: Event,
}

impl StaticTransition {
    /// Create a static transition
    pub fn new(source: Event, destination: Event) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Create a static transition already boxed for a transition list
    pub fn boxed<C: FlowContext>(source: Event, destination: Event) -> BoxedTransition<C> {
        Arc::new(Self::new(source, destination))
    }
}

#[async_trait]
impl<C: FlowContext> Transition<C> for StaticTransition {
    fn source(&self) -> &Event {
        &self.source
    }

    async fn destination(&self, _ctx: &C) -> anyhow::Result<Vec<Event>> {
        Ok(vec![self.destination.clone()])
    }

    fn is_exclusive(&self) -> bool {
        false
    }

    fn possible_destinations(&self) -> Vec<PossibleDestination> {
        vec![PossibleDestination::new(self.destination.clone(), "static")]
    }
}

type DestinationFn<C> = dyn Fn(C) -> BoxFuture<'static, anyhow::Result<Vec<Event>>> + Send + Sync;

/// Edge whose destination is computed by caller code; always exclusive
pub struct DynamicTransition<C: FlowContext> {
    source: Event,
    destination_fn: Arc<DestinationFn<C>>,
    possible_destinations: Vec<PossibleDestination>,
}

impl<C: FlowContext> DynamicTransition<C> {
    /// Create a dynamic transition
    ///
    /// `possible_destinations` documents what `destination_fn` may return;
    /// it is used for introspection only.
    pub fn new<F, Fut>(
        source: Event,
        destination_fn: F,
        possible_destinations: Vec<PossibleDestination>,
    ) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<Event>>> + Send + 'static,
    {
        Self {
            source,
            destination_fn: Arc::new(move |ctx: C| destination_fn(ctx).boxed()),
            possible_destinations,
        }
    }

    /// Box into a transition list entry
    pub fn boxed(self) -> BoxedTransition<C> {
        Arc::new(self)
    }
}

#[async_trait]
impl<C: FlowContext> Transition<C> for DynamicTransition<C> {
    fn source(&self) -> &Event {
        &self.source
    }

    async fn destination(&self, ctx: &C) -> anyhow::Result<Vec<Event>> {
        (self.destination_fn)(ctx.clone()).await
    }

    fn is_exclusive(&self) -> bool {
        true
    }

    fn possible_destinations(&self) -> Vec<PossibleDestination> {
        self.possible_destinations.clone()
    }
}
