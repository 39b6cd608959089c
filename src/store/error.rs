//! Fact store errors

use std::fmt;
use std::time::Duration;

/// Boxed cause carried by store errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug)]
pub enum StoreError {
    /// A new connection could not be opened
    Connect(BoxError),
    /// The connection failed in a way a fresh connection may not
    Stale(BoxError),
    /// The statement failed
    Query(BoxError),
    /// No connection became available in time
    PoolTimeout(Duration),
    /// The caller's token was cancelled or expired
    Cancelled,
}

impl StoreError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StoreError::Cancelled)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Connect(e) => write!(f, "Failed to open connection: {}", e),
            StoreError::Stale(e) => write!(f, "Connection failed: {}", e),
            StoreError::Query(e) => write!(f, "Query failed: {}", e),
            StoreError::PoolTimeout(waited) => {
                write!(f, "No connection available after {} ms", waited.as_millis())
            }
            StoreError::Cancelled => write!(f, "Query cancelled"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Connect(e) | StoreError::Stale(e) | StoreError::Query(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}
