//! Aggregation specs to logical plans

use std::collections::HashSet;

use super::error::PlanError;
use crate::model::{Aggregation, FactModel};
use crate::plan::{
    Aggregate, AggregateExpr, Expr, Filter, Limit, PlanNode, ProjectExpr, Scan, Sort, SortKey,
};
use crate::predicate::Predicate;
use crate::query::AggregationSpec;
use crate::result::ResultColumn;

/// A validated aggregation, ready to emit.
///
/// `plan` is `None` when the predicate excludes every row; the columns are
/// still known so callers can return an empty table with the right schema.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub columns: Vec<ResultColumn>,
    pub plan: Option<PlanNode>,
}

impl CompiledQuery {
    pub fn is_short_circuit(&self) -> bool {
        self.plan.is_none()
    }
}

/// Plan a grouped aggregate over the fact table.
///
/// Output is one column per group field in request order, then one per
/// measure. Rows are ordered by the group fields ascending; a top-N request
/// orders by its measure descending first and keeps `n` rows.
pub fn plan_aggregation(
    model: &FactModel,
    spec: &AggregationSpec,
    predicate: &Predicate,
) -> Result<CompiledQuery, PlanError> {
    if spec.group_fields.is_empty() && spec.measures.is_empty() {
        return Err(PlanError::EmptyQuery);
    }

    let mut names = HashSet::new();
    let mut columns = Vec::new();
    let mut group_by = Vec::new();
    for name in &spec.group_fields {
        let field = model
            .get_field(name)
            .ok_or_else(|| PlanError::UnknownField(name.clone()))?;
        if !names.insert(name.clone()) {
            return Err(PlanError::DuplicateField(name.clone()));
        }
        columns.push(ResultColumn::group(name.clone()));
        group_by.push(ProjectExpr { expr: Expr::column(field.column.clone()), alias: name.clone() });
    }

    let mut aggregates = Vec::new();
    for measure in &spec.measures {
        let field = model
            .get_field(&measure.field)
            .ok_or_else(|| PlanError::UnknownField(measure.field.clone()))?;
        if matches!(measure.op, Aggregation::Sum | Aggregation::Avg) && !field.field_type.is_numeric() {
            return Err(PlanError::NonNumericMeasure { field: measure.field.clone(), op: measure.op });
        }
        let alias = measure.output_name();
        if !names.insert(alias.clone()) {
            return Err(PlanError::DuplicateMeasure(alias));
        }
        columns.push(ResultColumn::measure(alias.clone()));
        aggregates.push(AggregateExpr { func: measure.op, expr: Expr::column(field.column.clone()), alias });
    }

    if let Some(top) = &spec.top {
        if !spec.measures.iter().any(|m| m.output_name() == top.measure) {
            return Err(PlanError::UnknownSortColumn(top.measure.clone()));
        }
    }

    let filter = match predicate {
        Predicate::Nothing { .. } => return Ok(CompiledQuery { columns, plan: None }),
        Predicate::All => None,
        Predicate::Where(expr) => Some(expr.clone()),
    };

    let mut plan = PlanNode::Scan(Scan::new(model.fact_table.clone()));
    if let Some(predicate) = filter {
        plan = PlanNode::Filter(Filter { input: Box::new(plan), predicate });
    }
    plan = PlanNode::Aggregate(Aggregate { input: Box::new(plan), group_by, aggregates });

    let mut sort_keys = Vec::new();
    if let Some(top) = &spec.top {
        sort_keys.push(SortKey::desc(top.measure.clone()));
    }
    sort_keys.extend(spec.group_fields.iter().map(SortKey::asc));
    if !sort_keys.is_empty() {
        plan = PlanNode::Sort(Sort { input: Box::new(plan), sort_keys });
    }
    if let Some(top) = &spec.top {
        plan = PlanNode::Limit(Limit { input: Box::new(plan), count: top.n });
    }

    Ok(CompiledQuery { columns, plan: Some(plan) })
}
