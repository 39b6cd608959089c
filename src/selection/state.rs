//! The per-dimension selection state machine

use serde::Serialize;

/// Aggregate state of one dimension's checkboxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionStatus {
    AllChecked,
    AllUnchecked,
    Partial,
}

/// Checked flags for an ordered option list plus its "select all" control.
///
/// `select_all` is recomputed after every transition as the AND of all
/// option flags, so it is true exactly when every option is checked
/// (vacuously true for an empty option list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<K> {
    options: Vec<K>,
    checked: Vec<bool>,
    select_all: bool,
}

impl<K: PartialEq + Clone> Selection<K> {
    /// Every option checked, the initial state of a session
    pub fn all_checked(options: Vec<K>) -> Self {
        let checked = vec![true; options.len()];
        Self { options, checked, select_all: true }
    }

    pub fn options(&self) -> &[K] {
        &self.options
    }

    pub fn select_all(&self) -> bool {
        self.select_all
    }

    pub fn is_checked(&self, option: &K) -> Option<bool> {
        self.position(option).map(|i| self.checked[i])
    }

    /// Set every option to `checked`
    pub fn toggle_all(&mut self, checked: bool) {
        self.checked.iter_mut().for_each(|c| *c = checked);
        self.recompute();
    }

    /// Set one option; returns false when the option is not listed
    pub fn toggle_option(&mut self, option: &K, checked: bool) -> bool {
        match self.position(option) {
            Some(i) => {
                self.checked[i] = checked;
                self.recompute();
                true
            }
            None => false,
        }
    }

    pub fn status(&self) -> SelectionStatus {
        let on = self.checked.iter().filter(|c| **c).count();
        if on == self.checked.len() {
            SelectionStatus::AllChecked
        } else if on == 0 {
            SelectionStatus::AllUnchecked
        } else {
            SelectionStatus::Partial
        }
    }

    /// Options in list order with their flags
    pub fn iter(&self) -> impl Iterator<Item = (&K, bool)> {
        self.options.iter().zip(self.checked.iter().copied())
    }

    pub fn checked_options(&self) -> impl Iterator<Item = &K> {
        self.iter().filter(|(_, c)| *c).map(|(k, _)| k)
    }

    /// Carry flags over to a new option list.
    ///
    /// Options present in both keep their flag; new options take the
    /// current "select all" value.
    pub fn rebase(&self, options: Vec<K>) -> Self {
        let checked = options
            .iter()
            .map(|k| self.is_checked(k).unwrap_or(self.select_all))
            .collect();
        let mut next = Self { options, checked, select_all: self.select_all };
        next.recompute();
        next
    }

    fn position(&self, option: &K) -> Option<usize> {
        self.options.iter().position(|k| k == option)
    }

    fn recompute(&mut self) {
        self.select_all = self.checked.iter().all(|c| *c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years() -> Selection<i64> {
        Selection::all_checked(vec![2022, 2023, 2024])
    }

    #[test]
    fn test_starts_all_checked() {
        let s = years();
        assert!(s.select_all());
        assert_eq!(s.status(), SelectionStatus::AllChecked);
    }

    #[test]
    fn test_toggle_all_sets_every_option() {
        let mut s = years();
        s.toggle_all(false);
        assert!(!s.select_all());
        assert_eq!(s.status(), SelectionStatus::AllUnchecked);
        assert!(s.iter().all(|(_, c)| !c));
        s.toggle_all(true);
        assert!(s.iter().all(|(_, c)| c));
        assert!(s.select_all());
    }

    #[test]
    fn test_unchecking_one_clears_select_all() {
        let mut s = years();
        assert!(s.toggle_option(&2023, false));
        assert!(!s.select_all());
        assert_eq!(s.status(), SelectionStatus::Partial);
    }

    #[test]
    fn test_checking_last_restores_select_all() {
        let mut s = years();
        s.toggle_all(false);
        s.toggle_option(&2022, true);
        s.toggle_option(&2023, true);
        assert!(!s.select_all());
        s.toggle_option(&2024, true);
        assert!(s.select_all());
    }

    #[test]
    fn test_unknown_option_is_reported() {
        let mut s = years();
        assert!(!s.toggle_option(&1999, false));
        assert!(s.select_all());
    }

    #[test]
    fn test_empty_selection_is_vacuously_all() {
        let mut s: Selection<i64> = Selection::all_checked(vec![]);
        s.toggle_all(false);
        assert!(s.select_all());
        assert_eq!(s.status(), SelectionStatus::AllChecked);
    }

    #[test]
    fn test_rebase_keeps_flags_and_inherits_select_all() {
        let mut s = years();
        s.toggle_option(&2022, false);
        let next = s.rebase(vec![2023, 2024, 2025]);
        assert_eq!(next.is_checked(&2025), Some(false));
        assert_eq!(next.is_checked(&2023), Some(true));
        assert!(!next.select_all());

        let full = years().rebase(vec![2024, 2025]);
        assert_eq!(full.is_checked(&2025), Some(true));
        assert!(full.select_all());
    }

    #[test]
    fn test_rebase_dropping_unchecked_option_recomputes() {
        let mut s = years();
        s.toggle_option(&2022, false);
        let next = s.rebase(vec![2023, 2024]);
        assert!(next.select_all());
    }
}
