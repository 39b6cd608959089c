//! Integration tests for the selection state store
//!
//! Every dimension runs the same state machine: "select all" is true exactly
//! when every option is checked, whatever sequence of events got it there.

use factslice::catalog::build_options;
use factslice::{
    Catalog, CategoryValue, Normalization, ResolvedFilter, SelectionEvent, SelectionStatus, SelectionStore,
};
use proptest::prelude::*;

fn catalog() -> Catalog {
    Catalog::from_options([
        build_options(
            "year",
            [2022, 2023, 2024].map(CategoryValue::Int),
            Normalization::Exact,
            "Unlabeled",
        ),
        build_options(
            "payment_method",
            [CategoryValue::Blank, CategoryValue::from("Card"), CategoryValue::from("Pix")],
            Normalization::Exact,
            "Unlabeled",
        ),
        build_options("segment", [CategoryValue::from("Private")], Normalization::Folded, "Unlabeled"),
    ])
}

fn event_strategy() -> impl Strategy<Value = SelectionEvent> {
    let options: Vec<(&'static str, &'static str)> = vec![
        ("year", "2022"),
        ("year", "2023"),
        ("year", "2024"),
        ("payment_method", ""),
        ("payment_method", "Card"),
        ("payment_method", "Pix"),
        ("segment", "private"),
    ];
    let dims = prop::sample::select(vec!["year", "payment_method", "segment"]);
    prop_oneof![
        (dims, any::<bool>()).prop_map(|(d, checked)| SelectionEvent::toggle_all(d, checked)),
        (prop::sample::select(options), any::<bool>())
            .prop_map(|((d, o), checked)| SelectionEvent::toggle_option(d, o, checked)),
    ]
}

proptest! {
    #[test]
    fn prop_select_all_is_and_of_options(events in prop::collection::vec(event_strategy(), 0..60)) {
        let catalog = catalog();
        let mut store = SelectionStore::new(&catalog);
        for event in &events {
            let state = store.apply(event).unwrap();
            let all = state.options.iter().all(|o| o.checked);
            prop_assert_eq!(state.select_all, all);
            for other in store.states() {
                prop_assert_eq!(other.select_all, other.options.iter().all(|o| o.checked));
            }
        }
    }

    #[test]
    fn prop_resolution_matches_flags(events in prop::collection::vec(event_strategy(), 0..40)) {
        let catalog = catalog();
        let mut store = SelectionStore::new(&catalog);
        for event in &events {
            store.apply(event).unwrap();
        }
        let resolved = store.resolve(&catalog).unwrap();
        for state in store.states() {
            let filter = resolved.filters.get(&state.dimension).unwrap();
            prop_assert_eq!(filter.is_unrestricted(), state.select_all);
            if !state.select_all {
                let checked = state.options.iter().filter(|o| o.checked).count();
                let ResolvedFilter::Values(values) = filter else { unreachable!() };
                prop_assert_eq!(values.len(), checked);
            }
        }
    }
}

// -- scenarios ---------------------------------------------------------------

#[test]
fn test_session_starts_all_checked() {
    let catalog = catalog();
    let store = SelectionStore::new(&catalog);
    for state in store.states() {
        assert_eq!(state.status, SelectionStatus::AllChecked);
        assert!(state.select_all);
    }
}

#[test]
fn test_toggle_all_sets_every_option() {
    let catalog = catalog();
    let mut store = SelectionStore::new(&catalog);
    let state = store.apply(&SelectionEvent::toggle_all("year", false)).unwrap();
    assert!(state.options.iter().all(|o| !o.checked));
    assert_eq!(state.status, SelectionStatus::AllUnchecked);
    let state = store.apply(&SelectionEvent::toggle_all("year", true)).unwrap();
    assert!(state.options.iter().all(|o| o.checked));
}

#[test]
fn test_unchecking_one_option_clears_select_all() {
    let catalog = catalog();
    let mut store = SelectionStore::new(&catalog);
    let state = store.apply(&SelectionEvent::toggle_option("year", "2023", false)).unwrap();
    assert!(!state.select_all);
    assert_eq!(state.is_checked("2022"), Some(true));
    assert_eq!(state.status, SelectionStatus::Partial);
}

#[test]
fn test_checking_last_unchecked_option_restores_select_all() {
    let catalog = catalog();
    let mut store = SelectionStore::new(&catalog);
    store.apply(&SelectionEvent::toggle_all("payment_method", false)).unwrap();
    store.apply(&SelectionEvent::toggle_option("payment_method", "", true)).unwrap();
    store.apply(&SelectionEvent::toggle_option("payment_method", "Card", true)).unwrap();
    let state = store.apply(&SelectionEvent::toggle_option("payment_method", "Pix", true)).unwrap();
    assert!(state.select_all);
    let resolved = store.resolve(&catalog).unwrap();
    assert_eq!(resolved.filters.get("payment_method"), Some(&ResolvedFilter::Unrestricted));
}

#[test]
fn test_dimensions_are_independent() {
    let catalog = catalog();
    let mut store = SelectionStore::new(&catalog);
    store.apply(&SelectionEvent::toggle_all("year", false)).unwrap();
    assert!(store.state("payment_method").unwrap().select_all);
    assert!(store.state("segment").unwrap().select_all);
}
