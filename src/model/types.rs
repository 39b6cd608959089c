//! Field type and aggregation definitions for the fact model

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::result::Value;

/// Storage type of a fact table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldType {
    /// 64-bit integer (years, months, counts)
    Integer,
    /// Floating point amount
    Real,
    /// Free text category
    #[default]
    Text,
    /// Calendar date stored as ISO 8601 text
    Date,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Integer => write!(f, "integer"),
            FieldType::Real => write!(f, "real"),
            FieldType::Text => write!(f, "text"),
            FieldType::Date => write!(f, "date"),
        }
    }
}

/// Error when parsing a field type string
#[derive(Debug, Clone)]
pub struct ParseFieldTypeError {
    pub input: String,
}

impl fmt::Display for ParseFieldTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown field type '{}'. Valid options: integer, real, text, date", self.input)
    }
}

impl std::error::Error for ParseFieldTypeError {}

impl FromStr for FieldType {
    type Err = ParseFieldTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "integer" | "int" | "i32" | "i64" | "bigint" => Ok(FieldType::Integer),
            "real" | "float" | "double" | "f64" | "decimal" | "numeric" => Ok(FieldType::Real),
            "text" | "string" | "varchar" => Ok(FieldType::Text),
            "date" => Ok(FieldType::Date),
            _ => Err(ParseFieldTypeError { input: s.to_string() }),
        }
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FieldType::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl FieldType {
    /// Check if values of this type are numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Real)
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Aggregation operators applied to a measure field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Aggregation {
    /// Sum of values
    #[default]
    Sum,
    /// Average of values
    Avg,
    /// Count of non-null values
    Count,
    /// Count of distinct non-null values
    CountDistinct,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

impl Aggregation {
    /// Lowercase operator name, used as the output column suffix
    pub fn suffix(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::Count => "count",
            Aggregation::CountDistinct => "count_distinct",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }

    /// Scalar result reported when no rows reach the aggregate.
    ///
    /// Sums and counts of nothing are zero; averages and extremes are undefined.
    pub fn empty_value(&self) -> Value {
        match self {
            Aggregation::Sum | Aggregation::Count | Aggregation::CountDistinct => Value::Int(0),
            Aggregation::Avg | Aggregation::Min | Aggregation::Max => Value::Null,
        }
    }
}

/// Error when parsing an aggregation string
#[derive(Debug, Clone)]
pub struct ParseAggregationError {
    pub input: String,
}

impl fmt::Display for ParseAggregationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown aggregation '{}'. Valid options: sum, avg, count, count_distinct, min, max", self.input)
    }
}

impl std::error::Error for ParseAggregationError {}

impl FromStr for Aggregation {
    type Err = ParseAggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "avg" | "average" => Ok(Aggregation::Avg),
            "count" => Ok(Aggregation::Count),
            "count_distinct" | "countdistinct" | "distinct_count" | "distinctcount" => Ok(Aggregation::CountDistinct),
            "min" | "minimum" => Ok(Aggregation::Min),
            "max" | "maximum" => Ok(Aggregation::Max),
            _ => Err(ParseAggregationError { input: s.to_string() }),
        }
    }
}

impl<'de> Deserialize<'de> for Aggregation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Aggregation::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Aggregation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.suffix())
    }
}
