//! Fact store access (verb module)
//!
//! A bounded pool of independent connections with a liveness check on
//! checkout, one transparent retry on a stale connection, and cooperative
//! cancellation of running statements.

mod cancel;
mod error;
mod pool;
mod sqlite;

pub use cancel::CancelToken;
pub use error::{BoxError, StoreError};
pub use pool::{ManageConnection, Pool, PoolStatus, PooledConnection};
pub use sqlite::{SqliteManager, SqliteStore};

use crate::emitter::SqlQuery;
use crate::result::Value;

/// Executes emitted statements and returns raw rows
pub trait FactStore: Send + Sync {
    fn execute(&self, query: &SqlQuery, token: &CancelToken) -> Result<Vec<Vec<Value>>, StoreError>;
}
