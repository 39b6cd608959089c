//! factslice - Slice a flat fact table by dimensional selections
//!
//! This library provides:
//! - Fact model definition types (FactModel, Field, Dimension) parsed from YAML
//! - Dimension catalogs with blank-value and spelling normalization
//! - Selection state with a consistent "select all" control per dimension
//! - Predicate and aggregation compilation to parameterised SQL
//! - Pooled, cancellable fact store access (SQLite)
//! - Derived metrics: zero-guarded ratios, period deltas, pivot grids
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `model/` - fact model and configuration (FactModel, Field, Dimension, Aggregation)
//! - `query/` - request types (AggregationSpec, MeasureSpec, DateRange)
//! - `plan/` - logical plan types (PlanNode, Expr, Param)
//! - `result/` - result types (ResultTable, Value)
//!
//! **Verb modules** (transformations):
//! - `parser/` - YAML → EngineConfig
//! - `catalog/` - FactModel + store → Catalog
//! - `selection/` - Catalog + events → ResolvedSelection
//! - `predicate/` - ResolvedSelection + DateRange → Predicate
//! - `planner/` - AggregationSpec + Predicate → PlanNode
//! - `emitter/` - PlanNode → SqlQuery
//! - `store/` - SqlQuery → rows
//! - `metrics/` - ResultTable → ratios, deltas, pivots
//! - `engine/` - Engine and Session, the inbound interface
//!
//! # Example
//!
//! ```ignore
//! use factslice::{parser, AggregationSpec, Aggregation, Engine, SelectionEvent};
//!
//! let config = parser::parse_file("clinic.yaml")?;
//! let engine = Engine::open(&config)?;
//! let token = engine.cancel_token();
//! let mut session = engine.start_session(&token)?.ready().unwrap();
//! session.apply(&SelectionEvent::toggle_option("year", "2022", false))?;
//! let spec = AggregationSpec::new()
//!     .group_by("year")
//!     .measure("value", Aggregation::Sum)
//!     .measure("visit", Aggregation::CountDistinct);
//! let table = session.run_aggregation(&spec, &token)?;
//! ```

pub mod model;
pub mod query;
pub mod plan;
pub mod result;
pub mod parser;
pub mod catalog;
pub mod selection;
pub mod predicate;
pub mod planner;
pub mod emitter;
pub mod store;
pub mod metrics;
pub mod engine;
pub mod error;

// Re-export commonly used types
pub use model::{FactModel, Field, Dimension, Normalization, FieldType, Aggregation, EngineConfig, StoreConfig};
pub use query::{AggregationSpec, MeasureSpec, DateRange, TopN};
pub use result::{ResultTable, ResultColumn, ColumnRole, Value};
pub use catalog::{Catalog, CatalogOption, CategoryValue, DimensionOptions, CatalogError, BLANK_OPTION_ID};
pub use selection::{SelectionStore, SelectionEvent, SelectionState, SelectionStatus, ResolvedFilter, FilterSet, ResolvedSelection, SelectionError};
pub use predicate::{compile_predicate, Predicate, CompileError};
pub use planner::{plan_aggregation, CompiledQuery, PlanError};
pub use emitter::{emit_sql, SqlQuery, EmitError};
pub use store::{FactStore, SqliteStore, CancelToken, StoreError};
pub use metrics::{ratio, period_delta, Delta, MetricError};
pub use engine::{Engine, Session, Outcome, QueryError, Summary, SummaryFields};
pub use error::ParseError;
