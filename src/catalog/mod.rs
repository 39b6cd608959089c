//! Dimension catalog (verb module)
//!
//! Enumerates, per dimension, the options a selection can check: distinct
//! raw values from the fact table, collapsed by the dimension's
//! normalization rule, with null and blank values gathered into a single
//! sentinel option listed first.

mod build;
mod error;
mod load;
mod option;

pub use build::{build_options, fold};
pub use error::{CatalogError, CatalogWarning};
pub use load::{list_options, Catalog};
pub use option::{trim_blank, CatalogOption, CategoryValue, DimensionOptions, BLANK_CHARS, BLANK_OPTION_ID};
