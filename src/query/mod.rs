//! Query types (nouns)
//!
//! What a caller asks for: group fields and measures, optionally a top-N
//! ranking, and an optional date range.

mod range;
mod spec;

pub use range::{parse_date, DateRange, ParseDateError};
pub use spec::{AggregationSpec, MeasureSpec, ParseMeasureError, TopN};
