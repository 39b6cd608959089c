//! Per-user session: a catalog, a selection and a date range

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use super::execute::Engine;
use super::error::{Outcome, QueryError};
use crate::catalog::Catalog;
use crate::metrics::ratio;
use crate::model::Aggregation;
use crate::predicate::CompileError;
use crate::query::{parse_date, AggregationSpec, DateRange, MeasureSpec};
use crate::result::{ResultTable, Value};
use crate::selection::{ResolvedSelection, SelectionError, SelectionEvent, SelectionState, SelectionStore};
use crate::store::CancelToken;

/// Fields behind the headline numbers of a dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryFields {
    /// Counted distinct: one value per visit
    pub visit: String,
    /// Counted: one row per procedure
    pub procedure: String,
    /// Summed: billed amount
    pub value: String,
}

/// Headline numbers under the current selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub visits: i64,
    pub procedures: i64,
    pub total: f64,
    #[serde(rename = "averageTicket")]
    pub average_ticket: f64,
}

/// Session-scoped state. Events are applied through `&mut self`, so one
/// session sees them in the order its owner delivers them.
pub struct Session {
    engine: Engine,
    catalog: Catalog,
    selection: SelectionStore,
    date_range: Option<DateRange>,
}

impl Session {
    /// Everything in `catalog` starts checked
    pub fn new(engine: Engine, catalog: Catalog) -> Self {
        let selection = SelectionStore::new(&catalog);
        Self { engine, catalog, selection, date_range: None }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref()
    }

    pub fn apply(&mut self, event: &SelectionEvent) -> Result<SelectionState, SelectionError> {
        self.selection.apply(event)
    }

    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        self.date_range = range;
    }

    /// The current selection resolved against the session catalog
    pub fn resolved_filter(&self) -> Result<ResolvedSelection, SelectionError> {
        self.selection.resolve(&self.catalog)
    }

    /// Reload every dimension, keeping checked states by option id
    pub fn refresh_catalog(&mut self, token: &CancelToken) -> Result<Outcome<()>, QueryError> {
        self.refresh_catalog_in_context(&[], token)
    }

    /// Reload every dimension restricted by the current selection of the
    /// `context` dimensions (for example, professionals active in the
    /// selected years), keeping checked states by option id
    pub fn refresh_catalog_in_context(
        &mut self,
        context: &[&str],
        token: &CancelToken,
    ) -> Result<Outcome<()>, QueryError> {
        let filters = self.resolved_filter()?.filters.restricted_to(context);
        let catalog = match self.engine.load_catalog(&filters, token)? {
            Outcome::Ready(catalog) => catalog,
            Outcome::Cancelled => return Ok(Outcome::Cancelled),
        };
        info!(from = self.catalog.version(), to = catalog.version(), "catalog refreshed");
        self.selection = self.selection.rebase(&catalog);
        self.catalog = catalog;
        Ok(Outcome::Ready(()))
    }

    /// Grouped aggregate under the current selection and date range
    pub fn run_aggregation(&self, spec: &AggregationSpec, token: &CancelToken) -> Result<Outcome<ResultTable>, QueryError> {
        let resolved = self.resolved_filter()?;
        self.engine.aggregate(spec, &resolved.filters, self.date_range.as_ref(), token)
    }

    /// One row per period, ordered by the period fields
    pub fn run_time_series(
        &self,
        period_fields: &[&str],
        measures: &[MeasureSpec],
        token: &CancelToken,
    ) -> Result<Outcome<ResultTable>, QueryError> {
        let spec = AggregationSpec {
            group_fields: period_fields.iter().map(|f| f.to_string()).collect(),
            measures: measures.to_vec(),
            top: None,
        };
        self.run_aggregation(&spec, token)
    }

    /// A single measure over every selected row
    pub fn run_scalar(&self, measure: &MeasureSpec, token: &CancelToken) -> Result<Outcome<Value>, QueryError> {
        let spec = AggregationSpec { group_fields: Vec::new(), measures: vec![measure.clone()], top: None };
        Ok(self
            .run_aggregation(&spec, token)?
            .map(|table| scalar(&table, 0).unwrap_or_else(|| measure.op.empty_value())))
    }

    /// Earliest and latest date under the current selection
    pub fn date_bounds(&self, token: &CancelToken) -> Result<Outcome<Option<(NaiveDate, NaiveDate)>>, QueryError> {
        let field = self
            .engine
            .model()
            .date_field
            .clone()
            .ok_or(QueryError::Compile(CompileError::NoDateField))?;
        let spec = AggregationSpec::new()
            .measure(field.clone(), Aggregation::Min)
            .measure(field, Aggregation::Max);
        Ok(self.run_aggregation(&spec, token)?.map(|table| {
            let date = |i| scalar(&table, i).as_ref().and_then(Value::as_str).and_then(|s| parse_date(s).ok());
            date(0).zip(date(1))
        }))
    }

    /// Distinct visits, procedure count, total value and average ticket
    pub fn summary(&self, fields: &SummaryFields, token: &CancelToken) -> Result<Outcome<Summary>, QueryError> {
        let spec = AggregationSpec::new()
            .measure(fields.visit.clone(), Aggregation::CountDistinct)
            .measure(fields.procedure.clone(), Aggregation::Count)
            .measure(fields.value.clone(), Aggregation::Sum);
        Ok(self.run_aggregation(&spec, token)?.map(|table| {
            let number = |i| scalar(&table, i).and_then(|v| v.as_f64()).unwrap_or(0.0);
            let (visits, procedures, total) = (number(0), number(1), number(2));
            Summary {
                visits: visits as i64,
                procedures: procedures as i64,
                total,
                average_ticket: ratio(total, visits),
            }
        }))
    }
}

/// Non-null cell of the first row
fn scalar(table: &ResultTable, column: usize) -> Option<Value> {
    table
        .rows()
        .first()
        .and_then(|row| row.get(column))
        .filter(|v| !v.is_null())
        .cloned()
}
