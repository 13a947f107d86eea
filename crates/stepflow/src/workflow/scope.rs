//! Hierarchical scope names

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::Event;
use crate::error::{Result, StepFlowError};

/// Path separator between scope names
pub const SCOPE_SEPARATOR: char = '/';

/// Address of a node in a compiled item tree
///
/// A scope is a leaf name plus an optional parent. Its qualified path is
/// `parent/child`, or just the name for a root. Two scopes are equal iff
/// their paths are equal.
#[derive(Debug, Clone)]
pub struct Scope {
    name: String,
    path: String,
    parent: Option<Arc<Scope>>,
}

impl Scope {
    /// Create a root scope
    pub fn root(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            parent: None,
        }
    }

    /// Create a scope nested under `parent`, or a root when there is none
    pub fn new(name: impl Into<String>, parent: Option<&Scope>) -> Self {
        match parent {
            None => Self::root(name),
            Some(parent) => {
                let name = name.into();
                Self {
                    path: format!("{}{}{}", parent.path, SCOPE_SEPARATOR, name),
                    name,
                    parent: Some(Arc::new(parent.clone())),
                }
            }
        }
    }

    /// Leaf name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Enclosing scope, if any
    pub fn parent(&self) -> Option<&Scope> {
        self.parent.as_deref()
    }

    /// Number of ancestors
    pub fn depth(&self) -> usize {
        self.parent().map_or(0, |p| p.depth() + 1)
    }

    /// The event that starts this scope
    pub fn start(&self) -> Event {
        Event::start(self)
    }

    /// The event emitted when this scope completes
    pub fn completed(&self) -> Event {
        Event::completed(self)
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Scope {}

impl Hash for Scope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Reject names that cannot be joined into a unique path
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(SCOPE_SEPARATOR) {
        return Err(StepFlowError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_scope() {
        let scope = Scope::root("flow");
        assert_eq!(scope.name(), "flow");
        assert_eq!(scope.path(), "flow");
        assert!(scope.parent().is_none());
        assert_eq!(scope.depth(), 0);
    }

    #[test]
    fn test_nested_scope_path() {
        let root = Scope::root("flow");
        let child = Scope::new("fetch", Some(&root));
        let leaf = Scope::new("retry", Some(&child));

        assert_eq!(leaf.path(), "flow/fetch/retry");
        assert_eq!(leaf.name(), "retry");
        assert_eq!(leaf.parent(), Some(&child));
        assert_eq!(leaf.depth(), 2);
    }

    #[test]
    fn test_equality_is_by_path() {
        let a = Scope::new("x", Some(&Scope::root("flow")));
        let b = Scope::root("flow/x");
        assert_eq!(a, b);
        assert_ne!(a, Scope::root("x"));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("step-1").is_ok());
        assert!(matches!(
            validate_name(""),
            Err(StepFlowError::InvalidName(_))
        ));
        assert!(matches!(
            validate_name("a/b"),
            Err(StepFlowError::InvalidName(name)) if name == "a/b"
        ));
    }
}
