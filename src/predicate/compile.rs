//! Resolved filters to a parameterised boolean expression

use tracing::debug;

use super::error::CompileError;
use crate::catalog::{CategoryValue, BLANK_CHARS};
use crate::model::{FactModel, Field, FieldType};
use crate::plan::{BinaryOperator, Expr, Literal, Param};
use crate::query::{parse_date, DateRange};
use crate::selection::{FilterSet, ResolvedFilter};

/// Row condition for one request
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Every row qualifies
    All,
    /// Rows matching the expression
    Where(Expr),
    /// No row can qualify; `dimension` excluded everything
    Nothing { dimension: String },
}

impl Predicate {
    pub fn is_nothing(&self) -> bool {
        matches!(self, Predicate::Nothing { .. })
    }

    pub fn expr(&self) -> Option<&Expr> {
        match self {
            Predicate::Where(expr) => Some(expr),
            _ => None,
        }
    }
}

/// Compile per-dimension filters and an optional date range.
///
/// Every dimension is validated before any short-circuit, so an unknown
/// dimension is reported even when another one excludes everything.
/// Unrestricted dimensions contribute no clause.
pub fn compile_predicate(
    model: &FactModel,
    filters: &FilterSet,
    range: Option<&DateRange>,
) -> Result<Predicate, CompileError> {
    let mut resolved = Vec::with_capacity(filters.len());
    for (name, filter) in filters.iter() {
        let dimension = model
            .get_dimension(name)
            .ok_or_else(|| CompileError::UnknownDimension(name.to_string()))?;
        let field = model
            .dimension_field(dimension)
            .ok_or_else(|| CompileError::UnknownField(dimension.field.clone()))?;
        resolved.push((name, field, filter));
    }

    if let Some((name, _, _)) = resolved.iter().find(|(_, _, f)| f.excludes_everything()) {
        debug!(dimension = *name, "selection excludes every row");
        return Ok(Predicate::Nothing { dimension: name.to_string() });
    }

    let mut clauses = Vec::new();
    for (name, field, filter) in resolved {
        if let ResolvedFilter::Values(values) = filter {
            clauses.push(values_clause(name, field, values.iter())?);
        }
    }

    if let Some(range) = range.filter(|r| !r.is_unbounded()) {
        let field = model.date_field().ok_or(CompileError::NoDateField)?;
        let column = || Expr::column(field.column.clone());
        if let Some(start) = range.start {
            clauses.push(Expr::binary(column(), BinaryOperator::GtEq, Expr::param(start.to_string())));
        }
        if let Some(end) = range.end {
            clauses.push(Expr::binary(column(), BinaryOperator::LtEq, Expr::param(end.to_string())));
        }
    }

    if clauses.is_empty() {
        Ok(Predicate::All)
    } else {
        Ok(Predicate::Where(Expr::and(clauses)))
    }
}

/// `col IN (...)`, widened with null and blank checks when the sentinel is selected
fn values_clause<'a>(
    dimension: &str,
    field: &Field,
    values: impl Iterator<Item = &'a CategoryValue>,
) -> Result<Expr, CompileError> {
    let column = || Expr::column(field.column.clone());
    let mut blank = false;
    let mut params = Vec::new();
    for value in values {
        if value.is_blank() {
            blank = true;
        } else {
            params.push(Expr::Param(bind_value(dimension, field, value)?));
        }
    }

    let mut alternatives = Vec::new();
    if !params.is_empty() {
        alternatives.push(Expr::In { expr: Box::new(column()), values: params });
    }
    if blank {
        // SQLite lets typed columns hold text
        alternatives.push(Expr::IsNull(Box::new(column())));
        alternatives.push(Expr::binary(
            Expr::Trim { expr: Box::new(column()), chars: Some(Box::new(Expr::param(BLANK_CHARS))) },
            BinaryOperator::Eq,
            Expr::Literal(Literal::String(String::new())),
        ));
    }

    Ok(if alternatives.len() == 1 {
        alternatives.remove(0)
    } else {
        Expr::Or(alternatives)
    })
}

/// Normalize a raw value to the field's native type
fn bind_value(dimension: &str, field: &Field, value: &CategoryValue) -> Result<Param, CompileError> {
    let invalid = || CompileError::InvalidValue {
        dimension: dimension.to_string(),
        value: value.to_string(),
        expected: field.field_type,
    };
    match (field.field_type, value) {
        (FieldType::Integer, CategoryValue::Int(i)) => Ok(Param::Int(*i)),
        (FieldType::Integer, CategoryValue::Text(s)) => s.trim().parse().map(Param::Int).map_err(|_| invalid()),
        (FieldType::Real, CategoryValue::Int(i)) => Ok(Param::Float(*i as f64)),
        (FieldType::Real, CategoryValue::Text(s)) => s.trim().parse().map(Param::Float).map_err(|_| invalid()),
        (FieldType::Text, CategoryValue::Int(i)) => Ok(Param::Text(i.to_string())),
        (FieldType::Text, CategoryValue::Text(s)) => Ok(Param::Text(s.clone())),
        (FieldType::Date, CategoryValue::Text(s)) => {
            parse_date(s).map(|d| Param::Text(d.to_string())).map_err(|_| invalid())
        }
        (FieldType::Date, CategoryValue::Int(_)) | (_, CategoryValue::Blank) => Err(invalid()),
    }
}
