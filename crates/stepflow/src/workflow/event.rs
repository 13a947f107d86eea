//! Events and persisted state
//!
//! An [`Event`] is the atomic unit of persisted state: its string form
//! `kind:scope/path` is both the key of the transition table and what a
//! caller stores between `apply` calls.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Scope;
use crate::error::StepFlowError;

/// Kind of an event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Command to start a scope
    Start,

    /// A scope has completed
    Completed,
}

impl EventKind {
    /// String form used in event identifiers
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point in the state machine: a kind applied to a scope path
///
/// Two events are equal iff kind and scope path are equal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "String", try_from = "String")]
pub struct Event {
    kind: EventKind,
    scope: String,
}

impl Event {
    /// The start command of a scope
    pub fn start(scope: &Scope) -> Self {
        Self {
            kind: EventKind::Start,
            scope: scope.path().to_string(),
        }
    }

    /// The completed event of a scope
    pub fn completed(scope: &Scope) -> Self {
        Self {
            kind: EventKind::Completed,
            scope: scope.path().to_string(),
        }
    }

    /// Event kind
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Qualified scope path
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Serialized identifier, `kind:scope/path`
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.scope)
    }
}

impl FromStr for Event {
    type Err = StepFlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, scope) = s
            .split_once(':')
            .ok_or_else(|| StepFlowError::InvalidEvent(s.to_string()))?;

        let kind = match kind {
            "start" => EventKind::Start,
            "completed" => EventKind::Completed,
            _ => return Err(StepFlowError::InvalidEvent(s.to_string())),
        };

        if scope.is_empty() {
            return Err(StepFlowError::InvalidEvent(s.to_string()));
        }

        Ok(Self {
            kind,
            scope: scope.to_string(),
        })
    }
}

impl From<Event> for String {
    fn from(event: Event) -> Self {
        event.to_string()
    }
}

impl TryFrom<String> for Event {
    type Error = StepFlowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Persisted continuation of a workflow instance
///
/// An ordered sequence of event identifiers. Empty means "not started".
/// Callers store and replay it verbatim; its JSON form is a plain array of
/// strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct State(Vec<String>);

impl State {
    /// The not-started state
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Whether the workflow has not started yet
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of events in the frontier
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Event identifiers, in order
    pub fn events(&self) -> &[String] {
        &self.0
    }

    /// Iterate over event identifiers
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether the frontier contains the given event
    pub fn contains(&self, event: &Event) -> bool {
        let id = event.id();
        self.0.iter().any(|e| *e == id)
    }

    /// Parse every identifier back into an [`Event`]
    pub fn parse_events(&self) -> Result<Vec<Event>, StepFlowError> {
        self.0.iter().map(|e| e.parse()).collect()
    }

    /// Consume into the raw identifiers
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for State {
    fn from(events: Vec<String>) -> Self {
        Self(events)
    }
}

impl From<Event> for State {
    fn from(event: Event) -> Self {
        Self(vec![event.id()])
    }
}

impl FromIterator<Event> for State {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self(iter.into_iter().map(|e| e.id()).collect())
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ids() {
        let scope = Scope::new("a", Some(&Scope::root("flow")));

        assert_eq!(Event::start(&scope).id(), "start:flow/a");
        assert_eq!(Event::completed(&scope).id(), "completed:flow/a");
        assert_eq!(scope.start().kind(), EventKind::Start);
        assert_eq!(scope.completed().scope(), "flow/a");
    }

    #[test]
    fn test_event_parse() {
        let event: Event = "completed:flow/a/b".parse().unwrap();
        assert_eq!(event.kind(), EventKind::Completed);
        assert_eq!(event.scope(), "flow/a/b");

        assert!(matches!(
            "finished:flow".parse::<Event>(),
            Err(StepFlowError::InvalidEvent(_))
        ));
        assert!("start".parse::<Event>().is_err());
        assert!("start:".parse::<Event>().is_err());
    }

    #[test]
    fn test_event_serializes_as_string() {
        let event = Scope::root("flow").start();
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, "\"start:flow\"");

        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
        assert!(serde_json::from_str::<Event>("\"bogus\"").is_err());
    }

    #[test]
    fn test_state_json_format() {
        let state = State::from(Scope::root("flow").completed());
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, "[\"completed:flow\"]");

        let parsed: State = serde_json::from_str("[]").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_state_helpers() {
        let root = Scope::root("flow");
        let state: State = vec![root.start(), root.completed()].into_iter().collect();

        assert_eq!(state.len(), 2);
        assert!(state.contains(&root.completed()));
        assert_eq!(state.to_string(), "[start:flow, completed:flow]");
        assert_eq!(state.parse_events().unwrap()[1], root.completed());
        assert_eq!(state.iter().next(), Some("start:flow"));
    }
}
