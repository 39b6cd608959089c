//! Plan node types

use super::expr::{AggregateExpr, Expr};

/// A node in the logical plan tree
#[derive(Debug, Clone, PartialEq)]
pub enum PlanNode {
    /// Scan the fact table
    Scan(Scan),
    /// Filter rows
    Filter(Filter),
    /// Aggregate (GROUP BY)
    Aggregate(Aggregate),
    /// Sort rows (ORDER BY)
    Sort(Sort),
    /// Keep the first rows (LIMIT)
    Limit(Limit),
}

/// Scan a table
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    /// Table name
    pub table: String,
    /// Columns read from the table; empty reads all
    pub columns: Vec<String>,
}

impl Scan {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }
}

/// Filter rows (WHERE clause)
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Input relation
    pub input: Box<PlanNode>,
    /// Filter predicate
    pub predicate: Expr,
}

/// Aggregate (GROUP BY)
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Input relation
    pub input: Box<PlanNode>,
    /// GROUP BY expressions, projected under their aliases
    pub group_by: Vec<ProjectExpr>,
    /// Aggregate expressions
    pub aggregates: Vec<AggregateExpr>,
}

/// A projected expression with its output alias
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectExpr {
    /// The expression to compute
    pub expr: Expr,
    /// Output column name
    pub alias: String,
}

/// Sort rows (ORDER BY)
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// Input relation
    pub input: Box<PlanNode>,
    /// Sort keys with direction
    pub sort_keys: Vec<SortKey>,
}

/// A sort key with direction
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    /// Output column name to sort by
    pub column: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        Self { column: column.into(), direction: SortDirection::Ascending }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self { column: column.into(), direction: SortDirection::Descending }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Keep the first `count` rows of the input
#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    pub input: Box<PlanNode>,
    pub count: u64,
}
