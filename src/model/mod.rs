//! Fact model types (nouns)
//!
//! These types represent the parsed model definition: the fixed field map of
//! the fact table and the dimensions a session can filter on.

mod dimension;
mod field;
mod schema;
mod types;

pub use dimension::{Dimension, Normalization};
pub use field::Field;
pub use schema::{FactModel, EngineConfig, StoreConfig, DEFAULT_BLANK_LABEL};
pub use types::{FieldType, Aggregation, ParseFieldTypeError, ParseAggregationError};
