//! Emitter errors

use std::fmt;

#[derive(Debug)]
pub enum EmitError {
    /// Unsupported plan node arrangement
    UnsupportedNode(String),
    /// Unsupported expression shape
    UnsupportedExpression(String),
    /// Invalid plan structure
    InvalidPlan(String),
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::UnsupportedNode(node) => {
                write!(f, "Unsupported plan node: {}", node)
            }
            EmitError::UnsupportedExpression(expr) => {
                write!(f, "Unsupported expression: {}", expr)
            }
            EmitError::InvalidPlan(msg) => {
                write!(f, "Invalid plan: {}", msg)
            }
        }
    }
}

impl std::error::Error for EmitError {}
