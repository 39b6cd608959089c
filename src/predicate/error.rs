//! Predicate compilation errors

use std::fmt;

use crate::model::FieldType;

#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Filter names a dimension the model does not declare
    UnknownDimension(String),
    /// Dimension or date field missing from the field map
    UnknownField(String),
    /// A selected value cannot be bound as the field's type
    InvalidValue { dimension: String, value: String, expected: FieldType },
    /// A date range was given but the model has no date field
    NoDateField,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::UnknownDimension(name) => write!(f, "Unknown dimension '{}'", name),
            CompileError::UnknownField(name) => write!(f, "Unknown field '{}'", name),
            CompileError::InvalidValue { dimension, value, expected } => {
                write!(f, "Value {} of dimension '{}' is not a valid {}", value, dimension, expected)
            }
            CompileError::NoDateField => write!(f, "Date range given but the model declares no dateField"),
        }
    }
}

impl std::error::Error for CompileError {}
