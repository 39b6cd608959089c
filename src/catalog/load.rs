//! Catalog loading against the fact store

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use super::build::build_options;
use super::error::{CatalogError, CatalogWarning};
use super::option::{CategoryValue, DimensionOptions};
use crate::emitter::emit_sql;
use crate::model::FactModel;
use crate::planner::plan_aggregation;
use crate::predicate::compile_predicate;
use crate::query::AggregationSpec;
use crate::selection::FilterSet;
use crate::store::{CancelToken, FactStore, StoreError};

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// The options of every dimension, as of one listing.
///
/// Each catalog gets a process-unique version so selections and resolved
/// filters can be checked against the catalog they were built from.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: u64,
    dimensions: BTreeMap<String, DimensionOptions>,
    warnings: Vec<CatalogWarning>,
}

impl Catalog {
    /// Assemble a catalog from already-built option lists
    pub fn from_options(dimensions: impl IntoIterator<Item = DimensionOptions>) -> Self {
        Self {
            version: next_version(),
            dimensions: dimensions.into_iter().map(|d| (d.dimension.clone(), d)).collect(),
            warnings: Vec::new(),
        }
    }

    /// List every dimension of the model without context restrictions
    pub fn load(model: &FactModel, store: &dyn FactStore, token: &CancelToken) -> Result<Self, CatalogError> {
        Self::load_with_context(model, store, &FilterSet::new(), token)
    }

    /// List every dimension, restricted to rows matching `context`.
    ///
    /// A dimension is never restricted by its own entry in `context`. When
    /// the store fails for a dimension, that dimension is listed empty and a
    /// warning is recorded; compile errors abort the load.
    pub fn load_with_context(
        model: &FactModel,
        store: &dyn FactStore,
        context: &FilterSet,
        token: &CancelToken,
    ) -> Result<Self, CatalogError> {
        let mut dimensions = BTreeMap::new();
        let mut warnings = Vec::new();

        for dimension in &model.dimensions {
            let options = match list_options(model, store, &dimension.name, context, token) {
                Ok(options) => options,
                Err(CatalogError::Unavailable { dimension: name, source }) => {
                    warn!(dimension = %name, error = %source, "catalog unavailable, listing no options");
                    warnings.push(CatalogWarning { dimension: name.clone(), message: source.to_string() });
                    DimensionOptions::empty(name)
                }
                Err(e) => return Err(e),
            };
            dimensions.insert(dimension.name.clone(), options);
        }

        let catalog = Self { version: next_version(), dimensions, warnings };
        info!(
            version = catalog.version,
            dimensions = catalog.dimensions.len(),
            warnings = catalog.warnings.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn dimension(&self, name: &str) -> Option<&DimensionOptions> {
        self.dimensions.get(name)
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &DimensionOptions> {
        self.dimensions.values()
    }

    pub fn warnings(&self) -> &[CatalogWarning] {
        &self.warnings
    }

    /// True when no dimension has any option (treat as "no data")
    pub fn is_empty(&self) -> bool {
        self.dimensions.values().all(DimensionOptions::is_empty)
    }
}

/// List the options of one dimension, restricted to rows matching `context`
pub fn list_options(
    model: &FactModel,
    store: &dyn FactStore,
    dimension: &str,
    context: &FilterSet,
    token: &CancelToken,
) -> Result<DimensionOptions, CatalogError> {
    let dim = model
        .get_dimension(dimension)
        .ok_or_else(|| CatalogError::UnknownDimension(dimension.to_string()))?;

    let context = context.without(dimension);
    let predicate = compile_predicate(model, &context, None)?;
    let spec = AggregationSpec::new().group_by(dim.field.clone());
    let compiled = plan_aggregation(model, &spec, &predicate)?;

    let plan = match compiled.plan {
        Some(plan) => plan,
        None => {
            debug!(dimension, "context excludes every row, listing no options");
            return Ok(DimensionOptions::empty(dimension));
        }
    };

    let query = emit_sql(&plan)?;
    let rows = store.execute(&query, token).map_err(|source| match source {
        StoreError::Cancelled => CatalogError::Cancelled,
        source => CatalogError::Unavailable { dimension: dimension.to_string(), source },
    })?;

    let raw = rows
        .iter()
        .filter_map(|row| row.first())
        .map(CategoryValue::from_value);
    let options = build_options(dimension, raw, dim.normalize, &model.blank_label);
    debug!(dimension, options = options.len(), "options listed");
    Ok(options)
}
