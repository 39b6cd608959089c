//! Catalog option types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::result::Value;

/// Option id of the sentinel standing for null and blank raw values
pub const BLANK_OPTION_ID: &str = "";

/// Characters a raw value may consist of and still count as blank.
///
/// Predicates strip the same set with SQL `TRIM`, so listing and filtering
/// agree on which rows the blank sentinel covers.
pub const BLANK_CHARS: &str = " \t\n\r";

/// Strip [`BLANK_CHARS`] from both ends
pub fn trim_blank(raw: &str) -> &str {
    raw.trim_matches(|c: char| BLANK_CHARS.contains(c))
}

/// A raw category value as stored in the fact table
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryValue {
    /// Null, empty, or made only of [`BLANK_CHARS`]
    Blank,
    Int(i64),
    Text(String),
}

impl CategoryValue {
    pub fn is_blank(&self) -> bool {
        matches!(self, CategoryValue::Blank)
    }

    /// Classify a store cell; the raw spelling of text is kept untouched
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => CategoryValue::Blank,
            Value::Int(i) => CategoryValue::Int(*i),
            Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => CategoryValue::Int(*f as i64),
            Value::Float(f) => CategoryValue::Text(f.to_string()),
            Value::Text(s) if trim_blank(s).is_empty() => CategoryValue::Blank,
            Value::Text(s) => CategoryValue::Text(s.clone()),
        }
    }
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryValue::Blank => write!(f, "<blank>"),
            CategoryValue::Int(i) => write!(f, "{}", i),
            CategoryValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for CategoryValue {
    fn from(v: i64) -> Self {
        CategoryValue::Int(v)
    }
}

impl From<&str> for CategoryValue {
    fn from(v: &str) -> Self {
        CategoryValue::Text(v.to_string())
    }
}

/// One selectable option of a dimension.
///
/// An option may stand for several raw spellings when the dimension folds
/// case, accents and spacing; all of them are kept so filtering matches
/// every row the option represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogOption {
    pub id: String,
    pub label: String,
    pub values: Vec<CategoryValue>,
}

impl CatalogOption {
    pub fn is_blank(&self) -> bool {
        self.id == BLANK_OPTION_ID
    }
}

/// The ordered options of one dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionOptions {
    pub dimension: String,
    pub options: Vec<CatalogOption>,
}

impl DimensionOptions {
    pub fn new(dimension: impl Into<String>, options: Vec<CatalogOption>) -> Self {
        Self { dimension: dimension.into(), options }
    }

    pub fn empty(dimension: impl Into<String>) -> Self {
        Self::new(dimension, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn option_ids(&self) -> Vec<String> {
        self.options.iter().map(|o| o.id.clone()).collect()
    }

    /// Every raw value covered by the listed options
    pub fn all_values(&self) -> BTreeSet<CategoryValue> {
        self.options.iter().flat_map(|o| o.values.iter().cloned()).collect()
    }
}
