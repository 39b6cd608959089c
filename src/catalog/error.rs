//! Catalog errors

use std::fmt;

use crate::planner::PlanError;
use crate::predicate::CompileError;
use crate::emitter::EmitError;
use crate::store::StoreError;

#[derive(Debug)]
pub enum CatalogError {
    /// Dimension not declared in the model
    UnknownDimension(String),
    /// The store could not be reached while listing options
    Unavailable { dimension: String, source: StoreError },
    /// The listing was cancelled by the caller
    Cancelled,
    /// Context filters did not compile
    Compile(CompileError),
    /// The listing query could not be planned
    Plan(PlanError),
    /// The listing query could not be emitted
    Emit(EmitError),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::UnknownDimension(name) => write!(f, "Unknown dimension '{}'", name),
            CatalogError::Unavailable { dimension, source } => {
                write!(f, "Catalog unavailable for dimension '{}': {}", dimension, source)
            }
            CatalogError::Cancelled => write!(f, "Catalog listing cancelled"),
            CatalogError::Compile(e) => write!(f, "{}", e),
            CatalogError::Plan(e) => write!(f, "{}", e),
            CatalogError::Emit(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Unavailable { source, .. } => Some(source),
            CatalogError::Compile(e) => Some(e),
            CatalogError::Plan(e) => Some(e),
            CatalogError::Emit(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CompileError> for CatalogError {
    fn from(e: CompileError) -> Self {
        CatalogError::Compile(e)
    }
}

impl From<PlanError> for CatalogError {
    fn from(e: PlanError) -> Self {
        CatalogError::Plan(e)
    }
}

impl From<EmitError> for CatalogError {
    fn from(e: EmitError) -> Self {
        CatalogError::Emit(e)
    }
}

/// A dimension that degraded to an empty option list during a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogWarning {
    pub dimension: String,
    pub message: String,
}

impl fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.dimension, self.message)
    }
}
