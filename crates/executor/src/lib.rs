//! Fee-aware translation of value deltas into venue-safe orders.

pub mod error;
pub mod planner;

pub use error::ExecutorError;
pub use planner::ExecutionPlanner;
