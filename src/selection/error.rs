//! Selection errors

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Event names a dimension the catalog does not list
    UnknownDimension(String),
    /// Event names an option the dimension does not list
    UnknownOption { dimension: String, option: String },
    /// Selection and catalog come from different listings
    CatalogMismatch { selection: u64, catalog: u64 },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::UnknownDimension(name) => {
                write!(f, "Unknown dimension '{}'", name)
            }
            SelectionError::UnknownOption { dimension, option } => {
                write!(f, "Unknown option '{}' for dimension '{}'", option, dimension)
            }
            SelectionError::CatalogMismatch { selection, catalog } => {
                write!(
                    f,
                    "Selection was built from catalog version {} but resolved against version {}",
                    selection, catalog
                )
            }
        }
    }
}

impl std::error::Error for SelectionError {}
