//! Resolved filters: the per-dimension outcome of a selection

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::catalog::CategoryValue;

/// What one dimension lets through
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolvedFilter {
    /// The full universe; no clause is needed
    Unrestricted,
    /// Exactly these raw values; an empty set excludes everything
    Values(BTreeSet<CategoryValue>),
}

impl ResolvedFilter {
    pub fn values(values: impl IntoIterator<Item = CategoryValue>) -> Self {
        ResolvedFilter::Values(values.into_iter().collect())
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, ResolvedFilter::Unrestricted)
    }

    pub fn excludes_everything(&self) -> bool {
        matches!(self, ResolvedFilter::Values(v) if v.is_empty())
    }
}

impl fmt::Display for ResolvedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedFilter::Unrestricted => write!(f, "*"),
            ResolvedFilter::Values(values) => {
                let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
        }
    }
}

/// Resolved filters keyed by dimension name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, ResolvedFilter>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, dimension: impl Into<String>, filter: ResolvedFilter) -> Self {
        self.insert(dimension, filter);
        self
    }

    pub fn insert(&mut self, dimension: impl Into<String>, filter: ResolvedFilter) {
        self.0.insert(dimension.into(), filter);
    }

    pub fn get(&self, dimension: &str) -> Option<&ResolvedFilter> {
        self.0.get(dimension)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedFilter)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A copy without one dimension's entry
    pub fn without(&self, dimension: &str) -> Self {
        let mut next = self.clone();
        next.0.remove(dimension);
        next
    }

    /// Keep only the named dimensions
    pub fn restricted_to(&self, dimensions: &[&str]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(k, _)| dimensions.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let restricted: Vec<String> = self
            .0
            .iter()
            .filter(|(_, v)| !v.is_unrestricted())
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        if restricted.is_empty() {
            write!(f, "unrestricted")
        } else {
            write!(f, "{}", restricted.join("; "))
        }
    }
}

impl FromIterator<(String, ResolvedFilter)> for FilterSet {
    fn from_iter<T: IntoIterator<Item = (String, ResolvedFilter)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Filters resolved from a selection, tagged with the catalog they came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSelection {
    #[serde(rename = "catalogVersion")]
    pub catalog_version: u64,
    pub filters: FilterSet,
}
