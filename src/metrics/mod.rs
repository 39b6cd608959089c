//! Derived metrics (verb module)
//!
//! Pure functions over result tables: zero-guarded ratios, period deltas
//! that keep "undefined" apart from "no change", and pivot grids.

mod derive;
mod error;
mod pivot;

pub use derive::{mean_of_nonzero, numeric_column, period_delta, ratio, ratio_column, series, Delta};
pub use error::MetricError;
pub use pivot::{pivot, PivotMeasure, PivotTable};
