//! Inbound interface (verb module)
//!
//! `Engine` runs stateless requests against the fact store; `Session` owns
//! the per-user catalog, selection state and date range and answers the
//! dashboard's aggregation, time series and scalar requests.

mod execute;
mod error;
mod session;

pub use execute::Engine;
pub use error::{Outcome, QueryError};
pub use session::{Session, Summary, SummaryFields};
