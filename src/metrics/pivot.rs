//! Row by column grids with totals

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::derive::{numeric_column, ratio};
use super::error::MetricError;
use crate::result::{ResultTable, Value};

/// What a pivot cell holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PivotMeasure {
    /// Sum of one measure column
    Sum(String),
    /// Sum of numerator over sum of denominator; totals are ratio-of-sums
    Ratio { numerator: String, denominator: String },
}

/// A grid keyed by the distinct values of two group columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    #[serde(rename = "rowKeys")]
    pub row_keys: Vec<Value>,
    #[serde(rename = "columnKeys")]
    pub column_keys: Vec<Value>,
    /// `cells[row][column]`; `None` where no input row matched
    pub cells: Vec<Vec<Option<f64>>>,
    #[serde(rename = "rowTotals")]
    pub row_totals: Vec<f64>,
    #[serde(rename = "columnTotals")]
    pub column_totals: Vec<f64>,
    #[serde(rename = "grandTotal")]
    pub grand_total: f64,
}

impl PivotTable {
    pub fn cell(&self, row: &Value, column: &Value) -> Option<f64> {
        let r = self.row_keys.binary_search_by(|k| k.total_cmp(row)).ok()?;
        let c = self.column_keys.binary_search_by(|k| k.total_cmp(column)).ok()?;
        self.cells[r][c]
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Acc {
    num: f64,
    den: f64,
}

impl Acc {
    fn add(&mut self, num: f64, den: f64) {
        self.num += num;
        self.den += den;
    }

    fn value(&self, measure: &PivotMeasure) -> f64 {
        match measure {
            PivotMeasure::Sum(_) => self.num,
            PivotMeasure::Ratio { .. } => ratio(self.num, self.den),
        }
    }
}

/// Distinct values in `total_cmp` order; NaN keys collapse like any other
fn sorted_keys(values: &[&Value]) -> Vec<Value> {
    let mut keys: Vec<Value> = values.iter().map(|v| (*v).clone()).collect();
    keys.sort_by(|a, b| a.total_cmp(b));
    keys.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
    keys
}

fn key_index(keys: &[Value], column: &str, value: &Value) -> Result<usize, MetricError> {
    keys.binary_search_by(|k| k.total_cmp(value))
        .map_err(|_| MetricError::UnmatchedKey { column: column.to_string(), value: value.to_string() })
}

/// Pivot an aggregated table on two of its group columns
pub fn pivot(
    table: &ResultTable,
    row_field: &str,
    column_field: &str,
    measure: &PivotMeasure,
) -> Result<PivotTable, MetricError> {
    let row_values = table
        .column(row_field)
        .ok_or_else(|| MetricError::UnknownColumn(row_field.to_string()))?;
    let column_values = table
        .column(column_field)
        .ok_or_else(|| MetricError::UnknownColumn(column_field.to_string()))?;
    let (nums, dens) = match measure {
        PivotMeasure::Sum(column) => {
            let nums = numeric_column(table, column)?;
            let dens = vec![0.0; nums.len()];
            (nums, dens)
        }
        PivotMeasure::Ratio { numerator, denominator } => {
            (numeric_column(table, numerator)?, numeric_column(table, denominator)?)
        }
    };

    let row_keys = sorted_keys(&row_values);
    let column_keys = sorted_keys(&column_values);

    let mut cells: BTreeMap<(usize, usize), Acc> = BTreeMap::new();
    let mut rows = vec![Acc::default(); row_keys.len()];
    let mut columns = vec![Acc::default(); column_keys.len()];
    let mut grand = Acc::default();

    for (i, (r, c)) in row_values.iter().zip(&column_values).enumerate() {
        let (r, c) = (key_index(&row_keys, row_field, r)?, key_index(&column_keys, column_field, c)?);
        cells.entry((r, c)).or_default().add(nums[i], dens[i]);
        rows[r].add(nums[i], dens[i]);
        columns[c].add(nums[i], dens[i]);
        grand.add(nums[i], dens[i]);
    }

    let grid = (0..row_keys.len())
        .map(|r| {
            (0..column_keys.len())
                .map(|c| cells.get(&(r, c)).map(|acc| acc.value(measure)))
                .collect()
        })
        .collect();

    Ok(PivotTable {
        row_keys,
        column_keys,
        cells: grid,
        row_totals: rows.iter().map(|a| a.value(measure)).collect(),
        column_totals: columns.iter().map(|a| a.value(measure)).collect(),
        grand_total: grand.value(measure),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ResultColumn;

    fn grid() -> ResultTable {
        let row = |p: &str, y: i64, v: f64, n: i64| vec![Value::from(p), Value::Int(y), Value::Float(v), Value::Int(n)];
        ResultTable::new(
            vec![
                ResultColumn::group("professional"),
                ResultColumn::group("year"),
                ResultColumn::measure("value_sum"),
                ResultColumn::measure("visit_count_distinct"),
            ],
            vec![
                row("Dr B", 2023, 100.0, 2),
                row("Dr A", 2023, 50.0, 1),
                row("Dr A", 2024, 90.0, 3),
            ],
        )
    }

    #[test]
    fn test_sum_grid_and_totals() {
        let p = pivot(&grid(), "professional", "year", &PivotMeasure::Sum("value_sum".into())).unwrap();
        assert_eq!(p.row_keys, vec![Value::from("Dr A"), Value::from("Dr B")]);
        assert_eq!(p.column_keys, vec![Value::Int(2023), Value::Int(2024)]);
        assert_eq!(p.cell(&Value::from("Dr B"), &Value::Int(2024)), None);
        assert_eq!(p.row_totals, vec![140.0, 100.0]);
        assert_eq!(p.column_totals, vec![150.0, 90.0]);
        assert_eq!(p.grand_total, 240.0);
    }

    #[test]
    fn test_ratio_grid_totals_are_ratio_of_sums() {
        let measure = PivotMeasure::Ratio {
            numerator: "value_sum".into(),
            denominator: "visit_count_distinct".into(),
        };
        let p = pivot(&grid(), "professional", "year", &measure).unwrap();
        assert_eq!(p.cell(&Value::from("Dr A"), &Value::Int(2024)), Some(30.0));
        assert_eq!(p.row_totals[0], 35.0);
        assert_eq!(p.column_totals[0], 50.0);
        assert_eq!(p.grand_total, 40.0);
    }

    #[test]
    fn test_nan_keys_get_their_own_slot() {
        let table = ResultTable::new(
            vec![ResultColumn::group("ratio"), ResultColumn::group("year"), ResultColumn::measure("n")],
            vec![
                vec![Value::Float(1.0), Value::Int(2023), Value::Int(4)],
                vec![Value::Float(f64::NAN), Value::Int(2023), Value::Int(2)],
                vec![Value::Float(f64::NAN), Value::Int(2024), Value::Int(3)],
            ],
        );
        let p = pivot(&table, "ratio", "year", &PivotMeasure::Sum("n".into())).unwrap();
        assert_eq!(p.row_keys.len(), 2);
        assert_eq!(p.row_totals, vec![4.0, 5.0]);
        assert_eq!(p.cells[0], vec![Some(4.0), None]);
        assert_eq!(p.cells[1], vec![Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_unknown_column() {
        assert_eq!(
            pivot(&grid(), "doctor", "year", &PivotMeasure::Sum("value_sum".into())),
            Err(MetricError::UnknownColumn("doctor".into()))
        );
    }
}
