//! Transition table introspection

use std::collections::HashMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::activity::FlowContext;
use crate::transition::{PossibleDestination, Transition};
use crate::workflow::Event;

/// One row of a compiled transition table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionDescriptor {
    /// Source event
    pub source: Event,

    /// Whether taking the transition yields to the caller
    pub exclusive: bool,

    /// Destinations the transition may produce
    pub destinations: Vec<PossibleDestination>,
}

impl<C: FlowContext> From<&dyn Transition<C>> for TransitionDescriptor {
    fn from(transition: &dyn Transition<C>) -> Self {
        Self {
            source: transition.source().clone(),
            exclusive: transition.is_exclusive(),
            destinations: transition.possible_destinations(),
        }
    }
}

/// Render rows as a Mermaid flowchart; exclusive edges are dotted
pub(crate) fn render_mermaid(rows: &[TransitionDescriptor]) -> String {
    let mut nodes: HashMap<String, usize> = HashMap::new();
    let mut out = String::from("flowchart TD\n");

    let mut node = |out: &mut String, event: &Event| -> String {
        let id = event.id();
        let next = nodes.len();
        let n = *nodes.entry(id.clone()).or_insert_with(|| {
            let _ = writeln!(out, "    n{next}[\"{}\"]", id.replace('"', "#quot;"));
            next
        });
        format!("n{n}")
    };

    let mut edges = Vec::new();
    for row in rows {
        let from = node(&mut out, &row.source);
        for dest in &row.destinations {
            let to = node(&mut out, &dest.event);
            let arrow = if row.exclusive { "-.->" } else { "-->" };
            edges.push(format!("    {from} {arrow}|{}| {to}", dest.reason));
        }
    }

    for edge in edges {
        out.push_str(&edge);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Scope;

    #[test]
    fn test_mermaid_rendering() {
        let root = Scope::root("flow");
        let a = Scope::new("a", Some(&root));
        let rows = vec![
            TransitionDescriptor {
                source: root.start(),
                exclusive: false,
                destinations: vec![PossibleDestination::new(a.start(), "static")],
            },
            TransitionDescriptor {
                source: a.start(),
                exclusive: true,
                destinations: vec![PossibleDestination::new(a.completed(), "completed")],
            },
        ];

        let chart = render_mermaid(&rows);
        assert_eq!(
            chart,
            "flowchart TD\n\
             \x20   n0[\"start:flow\"]\n\
             \x20   n1[\"start:flow/a\"]\n\
             \x20   n2[\"completed:flow/a\"]\n\
             \x20   n0 -->|static| n1\n\
             \x20   n1 -.->|completed| n2\n"
        );
    }

    #[test]
    fn test_descriptor_json() {
        let root = Scope::root("flow");
        let row = TransitionDescriptor {
            source: root.start(),
            exclusive: true,
            destinations: vec![PossibleDestination::new(root.completed(), "completed")],
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["source"], "start:flow");
        assert_eq!(json["destinations"][0]["event"], "completed:flow");
        assert_eq!(json["destinations"][0]["reason"], "completed");
    }

    #[test]
    fn test_mermaid_escapes_quotes() {
        let root = Scope::root("say \"hi\"");
        let rows = vec![TransitionDescriptor {
            source: root.start(),
            exclusive: true,
            destinations: vec![PossibleDestination::new(root.completed(), "completed")],
        }];

        let chart = render_mermaid(&rows);
        assert!(chart.contains("n0[\"start:say #quot;hi#quot;\"]"));
        assert!(chart.contains("n1[\"completed:say #quot;hi#quot;\"]"));
    }
}
