//! Derived metric errors

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum MetricError {
    /// The table has no column with this name
    UnknownColumn(String),
    /// A cell that should be numeric holds text
    NotNumeric { column: String, row: usize },
    /// The table already has a column with this name
    DuplicateColumn(String),
    /// A group value missing from the pivot's key index
    UnmatchedKey { column: String, value: String },
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricError::UnknownColumn(name) => write!(f, "Unknown column '{}'", name),
            MetricError::NotNumeric { column, row } => {
                write!(f, "Column '{}' is not numeric at row {}", column, row)
            }
            MetricError::DuplicateColumn(name) => write!(f, "Column '{}' already exists", name),
            MetricError::UnmatchedKey { column, value } => {
                write!(f, "Value {} of column '{}' has no pivot key", value, column)
            }
        }
    }
}

impl std::error::Error for MetricError {}
