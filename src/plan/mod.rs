//! Logical plan types (noun module)
//!
//! A small relational algebra tree over the single fact table, translated to
//! SQL by the emitter.

mod node;
mod expr;

pub use node::{PlanNode, Scan, Filter, Aggregate, ProjectExpr, Sort, SortKey, SortDirection, Limit};
pub use expr::{Expr, AggregateExpr, Column, Literal, Param, BinaryOperator};
