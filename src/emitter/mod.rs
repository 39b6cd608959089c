//! SQL emitter (verb module)
//!
//! Transforms a PlanNode into parameterised SQL for the fact store.

mod error;
mod sql;

pub use error::EmitError;
pub use sql::{emit_sql, quote_ident, SqlQuery};
