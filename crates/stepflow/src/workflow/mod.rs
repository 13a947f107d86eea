//! Naming model
//!
//! This module contains the addressing primitives of a compiled flow:
//! - [`Scope`] hierarchical node addresses
//! - [`Event`] start/completed points, the unit of persisted state
//! - [`State`] the persisted continuation

mod event;
mod scope;

pub use event::{Event, EventKind, State};
pub use scope::{validate_name, Scope, SCOPE_SEPARATOR};
