// Step flow configuration
//
// Defaults are constants so a compiled flow behaves the same everywhere;
// `from_env` is for callers that want to tune it per deployment.

use std::env;
use std::str::FromStr;

/// Default bound on transitions taken by one `apply` call
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// What `apply` does when the iteration bound is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IterationLimitPolicy {
    /// Return the progressed state without error; the next call continues
    #[default]
    Yield,

    /// Fail with [`StepFlowError::IterationLimit`](crate::StepFlowError::IterationLimit)
    Fail,
}

impl FromStr for IterationLimitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yield" => Ok(Self::Yield),
            "fail" => Ok(Self::Fail),
            other => Err(format!("unknown iteration limit policy: {other}")),
        }
    }
}

/// Configuration for a compiled step flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFlowConfig {
    /// Maximum transitions taken in one `apply` call
    pub max_iterations: usize,

    /// Behavior when `max_iterations` is reached
    pub on_iteration_limit: IterationLimitPolicy,
}

impl Default for StepFlowConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            on_iteration_limit: IterationLimitPolicy::Yield,
        }
    }
}

impl StepFlowConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `STEPFLOW_MAX_ITERATIONS`: per-call transition bound (default: 100)
    /// - `STEPFLOW_ON_ITERATION_LIMIT`: `yield` or `fail` (default: yield)
    ///
    /// Absent or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_iterations = env::var("STEPFLOW_MAX_ITERATIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v: &usize| *v > 0)
            .unwrap_or(defaults.max_iterations);

        let on_iteration_limit = env::var("STEPFLOW_ON_ITERATION_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.on_iteration_limit);

        Self {
            max_iterations,
            on_iteration_limit,
        }
    }

    /// Set the per-call transition bound
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the iteration-limit policy
    pub fn with_iteration_limit_policy(mut self, policy: IterationLimitPolicy) -> Self {
        self.on_iteration_limit = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StepFlowConfig::default();
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.on_iteration_limit, IterationLimitPolicy::Yield);
    }

    #[test]
    fn test_builder_setters() {
        let config = StepFlowConfig::default()
            .with_max_iterations(5)
            .with_iteration_limit_policy(IterationLimitPolicy::Fail);

        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.on_iteration_limit, IterationLimitPolicy::Fail);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("fail".parse::<IterationLimitPolicy>(), Ok(IterationLimitPolicy::Fail));
        assert_eq!(" Yield ".parse::<IterationLimitPolicy>(), Ok(IterationLimitPolicy::Yield));
        assert!("panic".parse::<IterationLimitPolicy>().is_err());
    }

    // Single test touching the process environment to avoid races between tests
    #[test]
    fn test_from_env() {
        env::set_var("STEPFLOW_MAX_ITERATIONS", "7");
        env::set_var("STEPFLOW_ON_ITERATION_LIMIT", "fail");
        let config = StepFlowConfig::from_env();
        assert_eq!(config.max_iterations, 7);
        assert_eq!(config.on_iteration_limit, IterationLimitPolicy::Fail);

        env::set_var("STEPFLOW_MAX_ITERATIONS", "lots");
        env::set_var("STEPFLOW_ON_ITERATION_LIMIT", "explode");
        let config = StepFlowConfig::from_env();
        assert_eq!(config, StepFlowConfig::default());

        env::remove_var("STEPFLOW_MAX_ITERATIONS");
        env::remove_var("STEPFLOW_ON_ITERATION_LIMIT");
    }
}
