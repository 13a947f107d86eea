//! Error types for compilation and execution

use crate::workflow::State;

/// Errors from compiling or applying a step flow
///
/// Compilation errors (`DuplicateName`, `InvalidName`) are returned by
/// [`StepFlow::compile`](crate::StepFlow::compile) and never by `apply`.
/// Caller errors are carried unchanged in [`StepFlowError::Callable`].
#[derive(Debug, thiserror::Error)]
pub enum StepFlowError {
    /// Two siblings of one sequence share a name
    #[error("name {name} must be unique in {scope}")]
    DuplicateName {
        /// Qualified path of the sequence
        scope: String,
        /// The repeated child name
        name: String,
    },

    /// Item name is empty or contains the path separator
    #[error("invalid item name {0:?}")]
    InvalidName(String),

    /// No transition matches any event of the frontier
    #[error("unhandled state {0}")]
    UnhandledState(State),

    /// A purely static cycle was detected within one apply call
    #[error("static transition cycle at state {0}")]
    StaticCycle(State),

    /// Iteration bound exhausted (only with `IterationLimitPolicy::Fail`)
    #[error("iteration limit of {0} reached before yielding")]
    IterationLimit(usize),

    /// Malformed event identifier
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// Error returned by an activity, condition or error handler
    #[error(transparent)]
    Callable(anyhow::Error),
}

impl StepFlowError {
    /// The caller-supplied error, if this error came from caller code
    pub fn callable(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Callable(err) => Some(err),
            _ => None,
        }
    }

    /// Whether this error was raised while compiling the item tree
    pub fn is_compilation(&self) -> bool {
        matches!(self, Self::DuplicateName { .. } | Self::InvalidName(_))
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = StepFlowError> = std::result::Result<T, E>;
