//! Aggregation requests

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::{Aggregation, ParseAggregationError};

/// One aggregated output column: an operator applied to a field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeasureSpec {
    pub field: String,
    pub op: Aggregation,
}

impl MeasureSpec {
    pub fn new(field: impl Into<String>, op: Aggregation) -> Self {
        Self { field: field.into(), op }
    }

    /// Deterministic output column name: `<field>_<op>`
    pub fn output_name(&self) -> String {
        format!("{}_{}", self.field, self.op.suffix())
    }
}

impl fmt::Display for MeasureSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.op)
    }
}

/// Error when parsing a `field:op` measure string
#[derive(Debug, Clone)]
pub enum ParseMeasureError {
    MissingOperator(String),
    Operator(ParseAggregationError),
}

impl fmt::Display for ParseMeasureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMeasureError::MissingOperator(input) => {
                write!(f, "Measure '{}' must be written as field:operator", input)
            }
            ParseMeasureError::Operator(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ParseMeasureError {}

impl FromStr for MeasureSpec {
    type Err = ParseMeasureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, op) = s
            .rsplit_once(':')
            .filter(|(field, _)| !field.is_empty())
            .ok_or_else(|| ParseMeasureError::MissingOperator(s.to_string()))?;
        let op = op.parse().map_err(ParseMeasureError::Operator)?;
        Ok(MeasureSpec::new(field, op))
    }
}

/// Keep only the `n` groups with the largest value of one measure column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopN {
    /// Output column name of the ranking measure
    pub measure: String,
    pub n: u64,
}

/// Group fields plus measures, built fresh per request.
///
/// Output columns are the group fields in request order followed by one
/// column per measure, named by [`MeasureSpec::output_name`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationSpec {
    #[serde(rename = "groupFields", default)]
    pub group_fields: Vec<String>,
    #[serde(default)]
    pub measures: Vec<MeasureSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<TopN>,
}

impl AggregationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.group_fields.push(field.into());
        self
    }

    pub fn measure(mut self, field: impl Into<String>, op: Aggregation) -> Self {
        self.measures.push(MeasureSpec::new(field, op));
        self
    }

    /// Rank groups by a measure column, largest first, and keep `n`
    pub fn top(mut self, measure: impl Into<String>, n: u64) -> Self {
        self.top = Some(TopN { measure: measure.into(), n });
        self
    }

    /// Output column names in result order
    pub fn output_names(&self) -> Vec<String> {
        self.group_fields
            .iter()
            .cloned()
            .chain(self.measures.iter().map(MeasureSpec::output_name))
            .collect()
    }
}

impl fmt::Display for AggregationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let measures: Vec<String> = self.measures.iter().map(|m| m.to_string()).collect();
        write!(f, "group by [{}] measures [{}]", self.group_fields.join(", "), measures.join(", "))?;
        if let Some(top) = &self.top {
            write!(f, " top {} by {}", top.n, top.measure)?;
        }
        Ok(())
    }
}
