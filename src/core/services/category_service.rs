use std::collections::BTreeSet;

use crate::ledger::Ledger;

pub struct CategoryService;

impl CategoryService {
    /// Envelope names and expense categories, trimmed, deduplicated and sorted. Comparison is
    /// case-sensitive, so `Food` and `food` are both listed.
    pub fn suggestions(ledger: &Ledger) -> Vec<String> {
        let names = ledger.envelopes.iter().map(|envelope| envelope.name.as_str());
        let categories = ledger
            .variable_expenses
            .iter()
            .map(|expense| expense.category.as_str());
        names
            .chain(categories)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Suggestions that start with `prefix`, ignoring case.
    pub fn matching(ledger: &Ledger, prefix: &str) -> Vec<String> {
        let needle = prefix.trim().to_lowercase();
        Self::suggestions(ledger)
            .into_iter()
            .filter(|value| value.to_lowercase().starts_with(&needle))
            .collect()
    }
}
