//! Option list construction from raw distinct values

use std::cmp::Ordering;
use std::collections::HashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::option::{trim_blank, CatalogOption, CategoryValue, DimensionOptions, BLANK_OPTION_ID};
use crate::model::Normalization;

/// Collapse case, accents and runs of whitespace: "  São  Paulo " -> "sao paulo"
pub fn fold(raw: &str) -> String {
    let stripped: String = raw.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn option_key(value: &CategoryValue, normalization: Normalization) -> String {
    match value {
        CategoryValue::Blank => BLANK_OPTION_ID.to_string(),
        CategoryValue::Int(i) => i.to_string(),
        CategoryValue::Text(s) => match normalization {
            Normalization::Exact => trim_blank(s).to_string(),
            Normalization::Folded => match fold(s) {
                folded if folded.is_empty() => trim_blank(s).to_string(),
                folded => folded,
            },
        },
    }
}

/// Build the ordered options of a dimension from distinct raw values.
///
/// Blank spellings collapse into one sentinel option sorted first. The first
/// spelling seen for a key becomes its label, so callers pass raw values in
/// a stable order.
pub fn build_options(
    dimension: &str,
    raw_values: impl IntoIterator<Item = CategoryValue>,
    normalization: Normalization,
    blank_label: &str,
) -> DimensionOptions {
    let mut options: Vec<CatalogOption> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for value in raw_values {
        let key = option_key(&value, normalization);
        match index.get(&key) {
            Some(&i) => {
                if !options[i].values.contains(&value) {
                    options[i].values.push(value);
                }
            }
            None => {
                let label = match &value {
                    CategoryValue::Blank => blank_label.to_string(),
                    CategoryValue::Int(i) => i.to_string(),
                    CategoryValue::Text(s) => trim_blank(s).to_string(),
                };
                index.insert(key.clone(), options.len());
                options.push(CatalogOption { id: key, label, values: vec![value] });
            }
        }
    }

    options.sort_by(compare_options);
    DimensionOptions::new(dimension, options)
}

fn numeric_key(option: &CatalogOption) -> Option<i64> {
    match option.values.first() {
        Some(CategoryValue::Int(i)) => Some(*i),
        _ => None,
    }
}

/// Blank first, then integers numerically, then labels case-insensitively
fn compare_options(a: &CatalogOption, b: &CatalogOption) -> Ordering {
    match (a.is_blank(), b.is_blank()) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    match (numeric_key(a), numeric_key(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a
            .label
            .to_lowercase()
            .cmp(&b.label.to_lowercase())
            .then_with(|| a.label.cmp(&b.label))
            .then_with(|| a.id.cmp(&b.id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CategoryValue {
        CategoryValue::Text(s.to_string())
    }

    #[test]
    fn test_fold() {
        assert_eq!(fold("  São   Paulo "), "sao paulo");
        assert_eq!(fold("CONVÊNIO"), "convenio");
        assert_eq!(fold("Particular"), fold("particular "));
    }

    #[test]
    fn test_blank_spellings_collapse_first() {
        let options = build_options(
            "payment",
            vec![CategoryValue::Blank, text("Pix"), text("Card")],
            Normalization::Exact,
            "Unlabeled",
        );
        assert_eq!(options.option_ids(), vec!["", "Card", "Pix"]);
        assert_eq!(options.options[0].label, "Unlabeled");
        assert_eq!(options.options[0].values, vec![CategoryValue::Blank]);
    }

    #[test]
    fn test_exact_trims_but_keeps_case() {
        let options = build_options(
            "professional",
            vec![text("Dr A"), text(" Dr A"), text("dr a")],
            Normalization::Exact,
            "Unlabeled",
        );
        assert_eq!(options.len(), 2);
        let dr_a = options.get("Dr A").unwrap();
        assert_eq!(dr_a.values, vec![text("Dr A"), text(" Dr A")]);
    }

    #[test]
    fn test_folded_first_spelling_wins() {
        let options = build_options(
            "segment",
            vec![text("Convênio"), text("CONVENIO"), text("convenio "), text("Particular")],
            Normalization::Folded,
            "Unlabeled",
        );
        assert_eq!(options.len(), 2);
        let first = &options.options[0];
        assert_eq!(first.id, "convenio");
        assert_eq!(first.label, "Convênio");
        assert_eq!(first.values.len(), 3);
    }

    #[test]
    fn test_non_blank_whitespace_never_takes_blank_id() {
        let options = build_options(
            "segment",
            vec![CategoryValue::Blank, text("\u{a0}")],
            Normalization::Folded,
            "Unlabeled",
        );
        assert_eq!(options.len(), 2);
        assert_eq!(options.options[0].values, vec![CategoryValue::Blank]);
        assert_eq!(options.options[1].id, "\u{a0}");
    }

    #[test]
    fn test_integers_sort_numerically() {
        let options = build_options(
            "month",
            vec![CategoryValue::Int(10), CategoryValue::Int(2), CategoryValue::Blank, CategoryValue::Int(1)],
            Normalization::Exact,
            "Unlabeled",
        );
        assert_eq!(options.option_ids(), vec!["", "1", "2", "10"]);
    }

    #[test]
    fn test_text_sorts_case_insensitively() {
        let options = build_options(
            "procedure",
            vec![text("botox"), text("Acupuncture"), text("Cleaning")],
            Normalization::Exact,
            "Unlabeled",
        );
        let labels: Vec<&str> = options.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Acupuncture", "botox", "Cleaning"]);
    }
}
