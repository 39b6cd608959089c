//! Stateless request execution over one fact model and store

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::error::{Outcome, QueryError};
use super::session::Session;
use crate::catalog::{Catalog, CatalogError};
use crate::emitter::emit_sql;
use crate::error::ParseError;
use crate::model::{EngineConfig, FactModel};
use crate::planner::plan_aggregation;
use crate::predicate::compile_predicate;
use crate::query::{AggregationSpec, DateRange};
use crate::result::ResultTable;
use crate::selection::FilterSet;
use crate::store::{CancelToken, FactStore, SqliteStore, StoreError};

/// Shared entry point; cheap to clone and safe to use from many threads
#[derive(Clone)]
pub struct Engine {
    model: Arc<FactModel>,
    store: Arc<dyn FactStore>,
    query_timeout: Option<Duration>,
}

impl Engine {
    pub fn new(model: FactModel, store: Arc<dyn FactStore>) -> Result<Self, ParseError> {
        model.validate()?;
        Ok(Self { model: Arc::new(model), store, query_timeout: None })
    }

    /// Engine over a pooled SQLite store described by `config`
    pub fn open(config: &EngineConfig) -> Result<Self, ParseError> {
        let store = SqliteStore::open(&config.store);
        let engine = Self::new(config.model.clone(), Arc::new(store))?;
        Ok(match config.store.query_timeout() {
            Some(timeout) => engine.with_query_timeout(timeout),
            None => engine,
        })
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn model(&self) -> &FactModel {
        &self.model
    }

    /// A token carrying the configured default deadline, if any
    pub fn cancel_token(&self) -> CancelToken {
        match self.query_timeout {
            Some(timeout) => CancelToken::with_timeout(timeout),
            None => CancelToken::new(),
        }
    }

    /// List every dimension, restricted by `context`
    pub fn load_catalog(&self, context: &FilterSet, token: &CancelToken) -> Result<Outcome<Catalog>, QueryError> {
        match Catalog::load_with_context(&self.model, self.store.as_ref(), context, token) {
            Ok(catalog) => Ok(Outcome::Ready(catalog)),
            Err(CatalogError::Cancelled) => Ok(Outcome::Cancelled),
            Err(e) => Err(QueryError::Catalog(e)),
        }
    }

    /// Load a fresh catalog and start a session with everything selected
    pub fn start_session(&self, token: &CancelToken) -> Result<Outcome<Session>, QueryError> {
        Ok(self
            .load_catalog(&FilterSet::new(), token)?
            .map(|catalog| Session::new(self.clone(), catalog)))
    }

    /// Compile and run one aggregation.
    ///
    /// Compilation and planning finish before the store is touched. A filter
    /// that excludes everything returns an empty table without a round trip.
    pub fn aggregate(
        &self,
        spec: &AggregationSpec,
        filters: &FilterSet,
        range: Option<&DateRange>,
        token: &CancelToken,
    ) -> Result<Outcome<ResultTable>, QueryError> {
        let predicate = compile_predicate(&self.model, filters, range)?;
        let compiled = plan_aggregation(&self.model, spec, &predicate)?;
        let plan = match compiled.plan {
            Some(plan) => plan,
            None => {
                debug!(%spec, "short-circuit, returning empty table");
                return Ok(Outcome::Ready(ResultTable::empty(compiled.columns)));
            }
        };

        let query = emit_sql(&plan)?;
        debug!(sql = %query.sql, params = query.params.len(), "running aggregation");
        match self.store.execute(&query, token) {
            Ok(rows) => Ok(Outcome::Ready(ResultTable::new(compiled.columns, rows))),
            Err(StoreError::Cancelled) => Ok(Outcome::Cancelled),
            Err(source) => Err(QueryError::Store {
                spec: spec.to_string(),
                filter: describe_filter(filters, range),
                source,
            }),
        }
    }
}

fn describe_filter(filters: &FilterSet, range: Option<&DateRange>) -> String {
    match range.filter(|r| !r.is_unbounded()) {
        Some(range) => format!("{}; date {}", filters, range),
        None => filters.to_string(),
    }
}
