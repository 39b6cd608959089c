//! Ratios and period-over-period deltas

use serde::{Serialize, Serializer};

use super::error::MetricError;
use crate::result::{ResultColumn, ResultTable, Value};

/// `numerator / denominator`, or 0 when the denominator is 0
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Percentage change from the previous period
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta {
    /// No previous period, or the previous value was 0
    Undefined,
    /// `(curr - prev) / prev * 100`
    Change(f64),
}

impl Delta {
    pub fn value(&self) -> Option<f64> {
        match self {
            Delta::Undefined => None,
            Delta::Change(v) => Some(*v),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Delta::Undefined)
    }
}

impl Serialize for Delta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Delta::Undefined => serializer.serialize_none(),
            Delta::Change(v) => serializer.serialize_some(v),
        }
    }
}

/// Delta of each entry against the one before it; the first is undefined
pub fn period_delta<K: Clone>(series: &[(K, f64)]) -> Vec<(K, Delta)> {
    let mut out = Vec::with_capacity(series.len());
    let mut prev: Option<f64> = None;
    for (key, curr) in series {
        let delta = match prev {
            Some(p) if p != 0.0 => Delta::Change((curr - p) / p * 100.0),
            _ => Delta::Undefined,
        };
        out.push((key.clone(), delta));
        prev = Some(*curr);
    }
    out
}

/// Numeric view of a column; nulls count as 0
pub fn numeric_column(table: &ResultTable, column: &str) -> Result<Vec<f64>, MetricError> {
    let values = table
        .column(column)
        .ok_or_else(|| MetricError::UnknownColumn(column.to_string()))?;
    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| match v {
            Value::Null => Ok(0.0),
            v => v.as_f64().ok_or_else(|| MetricError::NotNumeric { column: column.to_string(), row }),
        })
        .collect()
}

/// `(key, value)` pairs in table order, ready for [`period_delta`]
pub fn series(table: &ResultTable, key_column: &str, value_column: &str) -> Result<Vec<(Value, f64)>, MetricError> {
    let keys = table
        .column(key_column)
        .ok_or_else(|| MetricError::UnknownColumn(key_column.to_string()))?;
    let values = numeric_column(table, value_column)?;
    Ok(keys.into_iter().cloned().zip(values).collect())
}

/// Append `name = ratio(numerator, denominator)` row by row
pub fn ratio_column(
    table: &mut ResultTable,
    name: &str,
    numerator: &str,
    denominator: &str,
) -> Result<(), MetricError> {
    if table.column_index(name).is_some() {
        return Err(MetricError::DuplicateColumn(name.to_string()));
    }
    let nums = numeric_column(table, numerator)?;
    let dens = numeric_column(table, denominator)?;
    let values = nums.iter().zip(&dens).map(|(n, d)| Value::Float(ratio(*n, *d))).collect();
    table.push_column(ResultColumn::derived(name), values);
    Ok(())
}

/// Mean over the periods that had any activity; 0 when none did
pub fn mean_of_nonzero(values: &[f64]) -> f64 {
    let active: Vec<f64> = values.iter().copied().filter(|v| *v != 0.0).collect();
    ratio(active.iter().sum(), active.len() as f64)
}
