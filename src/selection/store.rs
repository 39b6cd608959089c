//! Selection store: one state machine per dimension, driven by UI events

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::SelectionError;
use super::resolve::{FilterSet, ResolvedFilter, ResolvedSelection};
use super::state::{Selection, SelectionStatus};
use crate::catalog::Catalog;

/// An inbound UI event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SelectionEvent {
    ToggleAll { dimension: String, checked: bool },
    ToggleOption { dimension: String, option: String, checked: bool },
}

impl SelectionEvent {
    pub fn toggle_all(dimension: impl Into<String>, checked: bool) -> Self {
        SelectionEvent::ToggleAll { dimension: dimension.into(), checked }
    }

    pub fn toggle_option(dimension: impl Into<String>, option: impl Into<String>, checked: bool) -> Self {
        SelectionEvent::ToggleOption { dimension: dimension.into(), option: option.into(), checked }
    }

    pub fn dimension(&self) -> &str {
        match self {
            SelectionEvent::ToggleAll { dimension, .. } | SelectionEvent::ToggleOption { dimension, .. } => dimension,
        }
    }
}

/// One option's flag in a state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionState {
    pub id: String,
    pub checked: bool,
}

/// Snapshot of one dimension after an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    pub dimension: String,
    #[serde(rename = "selectAll")]
    pub select_all: bool,
    pub status: SelectionStatus,
    pub options: Vec<OptionState>,
}

impl SelectionState {
    fn snapshot(dimension: &str, selection: &Selection<String>) -> Self {
        Self {
            dimension: dimension.to_string(),
            select_all: selection.select_all(),
            status: selection.status(),
            options: selection
                .iter()
                .map(|(id, checked)| OptionState { id: id.clone(), checked })
                .collect(),
        }
    }

    pub fn is_checked(&self, option: &str) -> Option<bool> {
        self.options.iter().find(|o| o.id == option).map(|o| o.checked)
    }
}

/// Session-scoped selection state for every dimension of a catalog.
///
/// Single writer: `apply` takes `&mut self`, so events are applied in the
/// order the owner receives them.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    catalog_version: u64,
    dimensions: BTreeMap<String, Selection<String>>,
}

impl SelectionStore {
    /// Every option of every dimension checked
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            catalog_version: catalog.version(),
            dimensions: catalog
                .dimensions()
                .map(|d| (d.dimension.clone(), Selection::all_checked(d.option_ids())))
                .collect(),
        }
    }

    pub fn catalog_version(&self) -> u64 {
        self.catalog_version
    }

    /// Apply one event; on error the store is unchanged
    pub fn apply(&mut self, event: &SelectionEvent) -> Result<SelectionState, SelectionError> {
        let dimension = event.dimension();
        let selection = self
            .dimensions
            .get_mut(dimension)
            .ok_or_else(|| SelectionError::UnknownDimension(dimension.to_string()))?;

        match event {
            SelectionEvent::ToggleAll { checked, .. } => selection.toggle_all(*checked),
            SelectionEvent::ToggleOption { option, checked, .. } => {
                if !selection.toggle_option(option, *checked) {
                    return Err(SelectionError::UnknownOption {
                        dimension: dimension.to_string(),
                        option: option.clone(),
                    });
                }
            }
        }
        Ok(SelectionState::snapshot(dimension, selection))
    }

    pub fn state(&self, dimension: &str) -> Option<SelectionState> {
        self.dimensions.get(dimension).map(|s| SelectionState::snapshot(dimension, s))
    }

    pub fn states(&self) -> Vec<SelectionState> {
        self.dimensions.iter().map(|(d, s)| SelectionState::snapshot(d, s)).collect()
    }

    /// Resolve every dimension against the catalog the store was built from.
    ///
    /// A dimension with no options resolves to the empty value set, since an
    /// empty catalog means no data rather than everything.
    pub fn resolve(&self, catalog: &Catalog) -> Result<ResolvedSelection, SelectionError> {
        if catalog.version() != self.catalog_version {
            return Err(SelectionError::CatalogMismatch {
                selection: self.catalog_version,
                catalog: catalog.version(),
            });
        }

        let mut filters = FilterSet::new();
        for (name, selection) in &self.dimensions {
            let options = catalog
                .dimension(name)
                .ok_or_else(|| SelectionError::UnknownDimension(name.clone()))?;
            let filter = if options.is_empty() {
                ResolvedFilter::values([])
            } else if selection.select_all() {
                ResolvedFilter::Unrestricted
            } else {
                ResolvedFilter::values(
                    selection
                        .checked_options()
                        .filter_map(|id| options.get(id))
                        .flat_map(|o| o.values.iter().cloned()),
                )
            };
            filters.insert(name.clone(), filter);
        }

        Ok(ResolvedSelection { catalog_version: self.catalog_version, filters })
    }

    /// Carry the current flags over to a newer catalog
    pub fn rebase(&self, catalog: &Catalog) -> Self {
        let dimensions = catalog
            .dimensions()
            .map(|d| {
                let selection = match self.dimensions.get(&d.dimension) {
                    Some(current) => current.rebase(d.option_ids()),
                    None => Selection::all_checked(d.option_ids()),
                };
                (d.dimension.clone(), selection)
            })
            .collect();
        Self { catalog_version: catalog.version(), dimensions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{build_options, CategoryValue};
    use crate::model::Normalization;

    fn catalog() -> Catalog {
        Catalog::from_options([
            build_options(
                "year",
                [CategoryValue::Int(2023), CategoryValue::Int(2024)],
                Normalization::Exact,
                "Unlabeled",
            ),
            build_options(
                "payment",
                [CategoryValue::Blank, CategoryValue::from("Card"), CategoryValue::from("Pix")],
                Normalization::Exact,
                "Unlabeled",
            ),
            build_options("empty", [], Normalization::Exact, "Unlabeled"),
        ])
    }

    #[test]
    fn test_initial_resolution() {
        let catalog = catalog();
        let store = SelectionStore::new(&catalog);
        let resolved = store.resolve(&catalog).unwrap();
        assert_eq!(resolved.filters.get("year"), Some(&ResolvedFilter::Unrestricted));
        assert!(resolved.filters.get("empty").unwrap().excludes_everything());
    }

    #[test]
    fn test_partial_resolves_to_values() {
        let catalog = catalog();
        let mut store = SelectionStore::new(&catalog);
        let state = store.apply(&SelectionEvent::toggle_option("payment", "Card", false)).unwrap();
        assert!(!state.select_all);
        assert_eq!(state.status, SelectionStatus::Partial);
        let resolved = store.resolve(&catalog).unwrap();
        assert_eq!(
            resolved.filters.get("payment"),
            Some(&ResolvedFilter::values([CategoryValue::Blank, CategoryValue::from("Pix")]))
        );
    }

    #[test]
    fn test_unchecked_dimension_resolves_empty() {
        let catalog = catalog();
        let mut store = SelectionStore::new(&catalog);
        store.apply(&SelectionEvent::toggle_all("year", false)).unwrap();
        assert!(store.resolve(&catalog).unwrap().filters.get("year").unwrap().excludes_everything());
    }

    #[test]
    fn test_unknown_targets_leave_store_unchanged() {
        let catalog = catalog();
        let mut store = SelectionStore::new(&catalog);
        assert_eq!(
            store.apply(&SelectionEvent::toggle_all("doctor", false)),
            Err(SelectionError::UnknownDimension("doctor".into()))
        );
        assert!(matches!(
            store.apply(&SelectionEvent::toggle_option("year", "1999", false)),
            Err(SelectionError::UnknownOption { .. })
        ));
        assert!(store.state("year").unwrap().select_all);
    }

    #[test]
    fn test_resolve_rejects_other_catalog() {
        let first = catalog();
        let second = catalog();
        let store = SelectionStore::new(&first);
        assert!(matches!(store.resolve(&second), Err(SelectionError::CatalogMismatch { .. })));
        assert!(store.rebase(&second).resolve(&second).is_ok());
    }

    #[test]
    fn test_event_json_shape() {
        let event: SelectionEvent =
            serde_json::from_str(r#"{"event": "toggleOption", "dimension": "year", "option": "2023", "checked": false}"#)
                .unwrap();
        assert_eq!(event, SelectionEvent::toggle_option("year", "2023", false));
    }
}
