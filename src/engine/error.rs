//! Engine errors and outcomes

use std::fmt;

use crate::catalog::CatalogError;
use crate::emitter::EmitError;
use crate::planner::PlanError;
use crate::predicate::CompileError;
use crate::selection::SelectionError;
use crate::store::StoreError;

/// Result of a request that may be cancelled by its caller
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ready(T),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::Cancelled => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ready(value) => Outcome::Ready(f(value)),
            Outcome::Cancelled => Outcome::Cancelled,
        }
    }
}

#[derive(Debug)]
pub enum QueryError {
    Selection(SelectionError),
    Compile(CompileError),
    Plan(PlanError),
    Emit(EmitError),
    Catalog(CatalogError),
    /// Store failure, with the request that caused it
    Store {
        spec: String,
        filter: String,
        source: StoreError,
    },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Selection(e) => write!(f, "{}", e),
            QueryError::Compile(e) => write!(f, "{}", e),
            QueryError::Plan(e) => write!(f, "{}", e),
            QueryError::Emit(e) => write!(f, "{}", e),
            QueryError::Catalog(e) => write!(f, "{}", e),
            QueryError::Store { spec, filter, source } => {
                write!(f, "{} (request: {}; filter: {})", source, spec, filter)
            }
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Selection(e) => Some(e),
            QueryError::Compile(e) => Some(e),
            QueryError::Plan(e) => Some(e),
            QueryError::Emit(e) => Some(e),
            QueryError::Catalog(e) => Some(e),
            QueryError::Store { source, .. } => Some(source),
        }
    }
}

impl From<SelectionError> for QueryError {
    fn from(e: SelectionError) -> Self {
        QueryError::Selection(e)
    }
}

impl From<CompileError> for QueryError {
    fn from(e: CompileError) -> Self {
        QueryError::Compile(e)
    }
}

impl From<PlanError> for QueryError {
    fn from(e: PlanError) -> Self {
        QueryError::Plan(e)
    }
}

impl From<EmitError> for QueryError {
    fn from(e: EmitError) -> Self {
        QueryError::Emit(e)
    }
}
