//! Selection state store (verb module)
//!
//! Keeps, per dimension, which options are checked and the state of the
//! dimension's "select all" control, and resolves the whole selection into
//! per-dimension filters.

mod error;
mod resolve;
mod state;
mod store;

pub use error::SelectionError;
pub use resolve::{FilterSet, ResolvedFilter, ResolvedSelection};
pub use state::{Selection, SelectionStatus};
pub use store::{OptionState, SelectionEvent, SelectionState, SelectionStore};
