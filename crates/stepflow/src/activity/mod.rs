//! Caller-supplied callables
//!
//! The engine invokes these but never inspects them:
//! - [`Activity`] runs the work of a function item
//! - [`Condition`] gates case, loop-until and wait-for items
//! - [`ErrorHandler`] decides retries for retry items
//!
//! Plain async closures implement all three.

mod definition;

pub use definition::{Activity, Condition, ErrorHandler, FlowContext};
