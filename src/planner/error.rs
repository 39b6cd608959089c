//! Planner errors

use std::fmt;

use crate::model::Aggregation;

#[derive(Debug, Clone, PartialEq)]
pub enum PlanError {
    /// No group fields and no measures
    EmptyQuery,
    /// Group field or measure field missing from the field map
    UnknownField(String),
    /// A group field listed twice
    DuplicateField(String),
    /// Two output columns would share a name
    DuplicateMeasure(String),
    /// SUM or AVG over a non-numeric field
    NonNumericMeasure { field: String, op: Aggregation },
    /// Top-N ranking names a column that is not a measure of the request
    UnknownSortColumn(String),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::EmptyQuery => {
                write!(f, "Query must have at least one group field or measure")
            }
            PlanError::UnknownField(name) => write!(f, "Unknown field '{}'", name),
            PlanError::DuplicateField(name) => write!(f, "Group field '{}' listed more than once", name),
            PlanError::DuplicateMeasure(name) => write!(f, "Output column '{}' produced more than once", name),
            PlanError::NonNumericMeasure { field, op } => {
                write!(f, "Cannot apply {} to non-numeric field '{}'", op, field)
            }
            PlanError::UnknownSortColumn(name) => {
                write!(f, "Top-N column '{}' is not a measure of this query", name)
            }
        }
    }
}

impl std::error::Error for PlanError {}
