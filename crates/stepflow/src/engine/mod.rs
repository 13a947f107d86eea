//! Step flow execution engine
//!
//! The engine module provides [`StepFlow`], which compiles an item tree once
//! into an immutable transition table and drives persisted states through it.

mod describe;
mod flow;
mod table;

pub use describe::TransitionDescriptor;
pub use flow::StepFlow;
pub use table::TransitionTable;
