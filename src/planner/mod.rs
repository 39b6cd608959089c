//! Aggregation compiler (verb module)
//!
//! Validates an AggregationSpec against the fact model and builds the
//! logical plan (PlanNode) for it.

mod aggregate;
mod error;

pub use aggregate::{plan_aggregation, CompiledQuery};
pub use error::PlanError;
