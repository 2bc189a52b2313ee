use std::fmt;

use serde::Serialize;

use crate::errors::{LedgerError, Result};
use crate::ledger::{Envelope, Ledger, MonthKey, Record};

pub const WARNING_RATIO: f64 = 0.9;
pub const OVER_RATIO: f64 = 1.0;

/// Traffic-light state of an envelope for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnvelopeStatus {
    /// Budget is zero or negative; no ratio can be computed.
    UndefinedBudget,
    Over,
    Warning,
    Good,
}

impl fmt::Display for EnvelopeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EnvelopeStatus::UndefinedBudget => "no budget",
            EnvelopeStatus::Over => "over budget",
            EnvelopeStatus::Warning => "near limit",
            EnvelopeStatus::Good => "ok",
        };
        f.write_str(label)
    }
}

/// Spending against one envelope in one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeReport {
    pub envelope_id: String,
    pub name: String,
    pub budget: f64,
    pub spent: f64,
    /// `budget - spent`; negative once overspent.
    pub remaining: f64,
    /// `spent / budget`, absent when the budget is undefined.
    pub ratio: Option<f64>,
    pub status: EnvelopeStatus,
    /// Bar fill in `0..=100`.
    pub display_percent: f64,
}

pub struct BudgetService;

impl BudgetService {
    /// Sum of the month's variable expenses whose category equals the envelope name, ignoring case.
    pub fn spent(ledger: &Ledger, envelope: &Envelope, month: MonthKey) -> f64 {
        ledger
            .variable_expenses
            .iter()
            .filter(|expense| month.contains_date_str(&expense.date))
            .filter(|expense| expense.matches_category(&envelope.name))
            .map(|expense| expense.amount)
            .filter(|amount| amount.is_finite())
            .sum()
    }

    pub fn evaluate(ledger: &Ledger, envelope: &Envelope, month: MonthKey) -> EnvelopeReport {
        let spent = Self::spent(ledger, envelope, month);
        let ratio = (envelope.budget > 0.0).then(|| spent / envelope.budget);
        let status = Self::status_for(ratio);
        let display_percent = ratio.map_or(0.0, |ratio| (ratio * 100.0).min(100.0));
        EnvelopeReport {
            envelope_id: envelope.id.clone(),
            name: envelope.name.clone(),
            budget: envelope.budget,
            spent,
            remaining: envelope.budget - spent,
            ratio,
            status,
            display_percent,
        }
    }

    pub fn evaluate_by_id(
        ledger: &Ledger,
        envelope_id: &str,
        month: MonthKey,
    ) -> Result<EnvelopeReport> {
        let envelope = ledger
            .envelope(envelope_id)
            .ok_or_else(|| LedgerError::not_found(Envelope::KIND, envelope_id))?;
        Ok(Self::evaluate(ledger, envelope, month))
    }

    /// Reports for every envelope, in ledger order.
    pub fn evaluate_all(ledger: &Ledger, month: MonthKey) -> Vec<EnvelopeReport> {
        ledger
            .envelopes
            .iter()
            .map(|envelope| Self::evaluate(ledger, envelope, month))
            .collect()
    }

    fn status_for(ratio: Option<f64>) -> EnvelopeStatus {
        match ratio {
            None => EnvelopeStatus::UndefinedBudget,
            Some(ratio) if ratio >= OVER_RATIO => EnvelopeStatus::Over,
            Some(ratio) if ratio >= WARNING_RATIO => EnvelopeStatus::Warning,
            Some(_) => EnvelopeStatus::Good,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::VariableExpense;

    fn month(raw: &str) -> MonthKey {
        raw.parse().unwrap()
    }

    fn ledger_with_spend(budget: f64, spends: &[(&str, &str, f64)]) -> (Ledger, String) {
        let mut ledger = Ledger::new();
        let id = ledger
            .add_envelope(Envelope::new("Groceries", budget))
            .unwrap();
        for (date, category, amount) in spends {
            ledger
                .add_variable_expense(VariableExpense::new(*date, *category, "", *amount))
                .unwrap();
        }
        (ledger, id)
    }

    #[test]
    fn case_insensitive_match_reaches_warning() {
        let (ledger, id) = ledger_with_spend(
            200.0,
            &[
                ("2025-03-04", "groceries", 120.0),
                ("2025-03-20", "GROCERIES", 70.0),
                ("2025-04-01", "groceries", 500.0),
                ("2025-03-21", "Fuel", 60.0),
            ],
        );
        let report = BudgetService::evaluate_by_id(&ledger, &id, month("2025-03")).unwrap();
        assert_eq!(report.spent, 190.0);
        assert_eq!(report.ratio, Some(0.95));
        assert_eq!(report.status, EnvelopeStatus::Warning);
        assert_eq!(report.remaining, 10.0);
    }

    #[test]
    fn zero_budget_is_undefined_even_with_spend() {
        let (ledger, id) = ledger_with_spend(0.0, &[("2025-03-04", "Groceries", 10.0)]);
        let report = BudgetService::evaluate_by_id(&ledger, &id, month("2025-03")).unwrap();
        assert_eq!(report.status, EnvelopeStatus::UndefinedBudget);
        assert_eq!(report.ratio, None);
        assert_eq!(report.display_percent, 0.0);
    }

    #[test]
    fn no_spend_is_good() {
        let (ledger, id) = ledger_with_spend(100.0, &[]);
        let report = BudgetService::evaluate_by_id(&ledger, &id, month("2025-03")).unwrap();
        assert_eq!(report.status, EnvelopeStatus::Good);
        assert_eq!(report.spent, 0.0);
    }

    #[test]
    fn overspend_caps_display_percent() {
        let (ledger, id) = ledger_with_spend(100.0, &[("2025-03-04", "Groceries", 150.0)]);
        let report = BudgetService::evaluate_by_id(&ledger, &id, month("2025-03")).unwrap();
        assert_eq!(report.status, EnvelopeStatus::Over);
        assert_eq!(report.display_percent, 100.0);
        assert_eq!(report.remaining, -50.0);
    }

    #[test]
    fn exact_budget_counts_as_over() {
        let (ledger, id) = ledger_with_spend(100.0, &[("2025-03-04", "Groceries", 100.0)]);
        let report = BudgetService::evaluate_by_id(&ledger, &id, month("2025-03")).unwrap();
        assert_eq!(report.status, EnvelopeStatus::Over);
    }

    #[test]
    fn unknown_envelope_is_not_found() {
        let ledger = Ledger::new();
        assert!(matches!(
            BudgetService::evaluate_by_id(&ledger, "nope", month("2025-03")),
            Err(LedgerError::NotFound { .. })
        ));
    }
}
