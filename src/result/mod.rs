//! Result types (nouns)
//!
//! The ordered, schema-stable output of an aggregation: one column per group
//! field in request order followed by one column per measure.

mod value;

pub use value::Value;

use serde::Serialize;
use std::fmt;

/// What a result column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    /// A group-by field
    Group,
    /// An aggregated measure
    Measure,
    /// Computed after aggregation (ratios and other derived metrics)
    Derived,
}

/// A named result column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultColumn {
    pub name: String,
    pub role: ColumnRole,
}

impl ResultColumn {
    pub fn group(name: impl Into<String>) -> Self {
        Self { name: name.into(), role: ColumnRole::Group }
    }

    pub fn measure(name: impl Into<String>) -> Self {
        Self { name: name.into(), role: ColumnRole::Measure }
    }

    pub fn derived(name: impl Into<String>) -> Self {
        Self { name: name.into(), role: ColumnRole::Derived }
    }
}

/// Ordered rows under a fixed column schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    columns: Vec<ResultColumn>,
    rows: Vec<Vec<Value>>,
}

impl ResultTable {
    pub fn new(columns: Vec<ResultColumn>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// A table with the given schema and no rows
    pub fn empty(columns: Vec<ResultColumn>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn columns(&self) -> &[ResultColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// All values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// A single cell
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// Append a column; `values` must hold one entry per row
    pub fn push_column(&mut self, column: ResultColumn, values: Vec<Value>) -> bool {
        if values.len() != self.rows.len() || self.column_index(&column.name).is_some() {
            return false;
        }
        self.columns.push(column);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        true
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.column_names().join(" | "))?;
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }
        Ok(())
    }
}
