use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    common::{new_id, require_positive, Identifiable, Record},
    envelope::Envelope,
    expense::VariableExpense,
    fixed::FixedExpense,
    income::{BaseIncome, OneOffIncome},
    lenient,
    month::MonthKey,
    savings::SavingsGoal,
};
use crate::errors::{LedgerError, Result};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The complete household snapshot: every record collection at a point in time.
///
/// Serialized field names match the JSON written by the original app so exports stay
/// interchangeable. Mutation commands validate their input and leave the snapshot untouched on
/// failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(rename = "schemaVersion", default = "Ledger::schema_version_default")]
    pub schema_version: u8,
    #[serde(
        rename = "ingresosBase",
        default,
        deserialize_with = "lenient::or_default"
    )]
    pub base_income: BaseIncome,
    #[serde(rename = "fijos", default, deserialize_with = "lenient::collection")]
    pub fixed_expenses: Vec<FixedExpense>,
    #[serde(rename = "sobres", default, deserialize_with = "lenient::collection")]
    pub envelopes: Vec<Envelope>,
    #[serde(rename = "huchas", default, deserialize_with = "lenient::collection")]
    pub savings_goals: Vec<SavingsGoal>,
    #[serde(
        rename = "ingresosPuntuales",
        default,
        deserialize_with = "lenient::collection"
    )]
    pub one_off_incomes: Vec<OneOffIncome>,
    #[serde(rename = "gastos", default, deserialize_with = "lenient::collection")]
    pub variable_expenses: Vec<VariableExpense>,
    #[serde(rename = "notasPorMes", default, deserialize_with = "lenient::notes")]
    pub notes: BTreeMap<String, String>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            base_income: BaseIncome::default(),
            fixed_expenses: Vec::new(),
            envelopes: Vec::new(),
            savings_goals: Vec::new(),
            one_off_incomes: Vec::new(),
            variable_expenses: Vec::new(),
            notes: BTreeMap::new(),
        }
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    pub fn record_count(&self) -> usize {
        self.fixed_expenses.len()
            + self.envelopes.len()
            + self.savings_goals.len()
            + self.one_off_incomes.len()
            + self.variable_expenses.len()
    }

    /// Drops every record and note.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn set_base_income(&mut self, income: BaseIncome) {
        debug!(total = income.total(), "base income updated");
        self.base_income = income;
    }

    // One-off incomes

    pub fn add_one_off_income(&mut self, income: OneOffIncome) -> Result<String> {
        insert_record(&mut self.one_off_incomes, income)
    }

    pub fn update_one_off_income<F>(&mut self, id: &str, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut OneOffIncome),
    {
        update_record(&mut self.one_off_incomes, id, mutator)
    }

    pub fn remove_one_off_income(&mut self, id: &str) -> Result<OneOffIncome> {
        remove_record(&mut self.one_off_incomes, id)
    }

    pub fn one_off_income(&self, id: &str) -> Option<&OneOffIncome> {
        find_record(&self.one_off_incomes, id)
    }

    // Fixed expenses

    pub fn add_fixed_expense(&mut self, expense: FixedExpense) -> Result<String> {
        insert_record(&mut self.fixed_expenses, expense)
    }

    pub fn update_fixed_expense<F>(&mut self, id: &str, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut FixedExpense),
    {
        update_record(&mut self.fixed_expenses, id, mutator)
    }

    /// Sets or clears the inclusive end month of a fixed expense.
    pub fn set_fixed_expense_end(&mut self, id: &str, end: Option<MonthKey>) -> Result<()> {
        update_record(&mut self.fixed_expenses, id, |expense| {
            expense.end_month = end.map(|month| month.to_string());
        })
    }

    pub fn remove_fixed_expense(&mut self, id: &str) -> Result<FixedExpense> {
        remove_record(&mut self.fixed_expenses, id)
    }

    pub fn fixed_expense(&self, id: &str) -> Option<&FixedExpense> {
        find_record(&self.fixed_expenses, id)
    }

    // Variable expenses

    pub fn add_variable_expense(&mut self, expense: VariableExpense) -> Result<String> {
        insert_record(&mut self.variable_expenses, expense)
    }

    pub fn update_variable_expense<F>(&mut self, id: &str, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut VariableExpense),
    {
        update_record(&mut self.variable_expenses, id, mutator)
    }

    pub fn remove_variable_expense(&mut self, id: &str) -> Result<VariableExpense> {
        remove_record(&mut self.variable_expenses, id)
    }

    pub fn variable_expense(&self, id: &str) -> Option<&VariableExpense> {
        find_record(&self.variable_expenses, id)
    }

    // Envelopes

    pub fn add_envelope(&mut self, envelope: Envelope) -> Result<String> {
        insert_record(&mut self.envelopes, envelope)
    }

    pub fn update_envelope<F>(&mut self, id: &str, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut Envelope),
    {
        update_record(&mut self.envelopes, id, mutator)
    }

    pub fn remove_envelope(&mut self, id: &str) -> Result<Envelope> {
        remove_record(&mut self.envelopes, id)
    }

    pub fn envelope(&self, id: &str) -> Option<&Envelope> {
        find_record(&self.envelopes, id)
    }

    // Savings goals

    pub fn add_savings_goal(&mut self, goal: SavingsGoal) -> Result<String> {
        insert_record(&mut self.savings_goals, goal)
    }

    pub fn update_savings_goal<F>(&mut self, id: &str, mutator: F) -> Result<()>
    where
        F: FnOnce(&mut SavingsGoal),
    {
        update_record(&mut self.savings_goals, id, mutator)
    }

    pub fn remove_savings_goal(&mut self, id: &str) -> Result<SavingsGoal> {
        remove_record(&mut self.savings_goals, id)
    }

    pub fn savings_goal(&self, id: &str) -> Option<&SavingsGoal> {
        find_record(&self.savings_goals, id)
    }

    /// Adds `amount` to the goal balance and returns the new balance.
    pub fn deposit(&mut self, goal_id: &str, amount: f64) -> Result<f64> {
        require_positive(amount)?;
        let goal = self.savings_goal_mut(goal_id)?;
        goal.deposit(amount);
        debug!(goal = %goal.name, amount, balance = goal.balance, "savings deposit");
        Ok(goal.balance)
    }

    /// Subtracts `amount` from the goal balance and returns the new balance.
    pub fn withdraw(&mut self, goal_id: &str, amount: f64) -> Result<f64> {
        require_positive(amount)?;
        let goal = self.savings_goal_mut(goal_id)?;
        goal.withdraw(amount);
        debug!(goal = %goal.name, amount, balance = goal.balance, "savings withdrawal");
        Ok(goal.balance)
    }

    fn savings_goal_mut(&mut self, id: &str) -> Result<&mut SavingsGoal> {
        self.savings_goals
            .iter_mut()
            .find(|goal| goal.id == id)
            .ok_or_else(|| LedgerError::not_found(SavingsGoal::KIND, id))
    }

    // Notes

    pub fn note(&self, month: MonthKey) -> Option<&str> {
        self.notes.get(&month.to_string()).map(String::as_str)
    }

    /// Stores the note for `month`; blank text removes it.
    pub fn set_note(&mut self, month: MonthKey, text: impl Into<String>) {
        let text = text.into();
        if text.trim().is_empty() {
            self.notes.remove(&month.to_string());
        } else {
            self.notes.insert(month.to_string(), text);
        }
    }
}

pub(crate) fn find_record<'a, T: Identifiable>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

fn insert_record<T: Record>(items: &mut Vec<T>, mut record: T) -> Result<String> {
    if record.id().trim().is_empty() {
        record.set_id(new_id());
    }
    if find_record(items, record.id()).is_some() {
        return Err(LedgerError::validation(format!(
            "{} id `{}` is already in use",
            T::KIND,
            record.id()
        )));
    }
    record.validate()?;
    let id = record.id().to_string();
    debug!(kind = T::KIND, %id, "record added");
    items.push(record);
    Ok(id)
}

/// Applies `mutator` to a copy and commits it only when the result still validates.
fn update_record<T, F>(items: &mut [T], id: &str, mutator: F) -> Result<()>
where
    T: Record,
    F: FnOnce(&mut T),
{
    let slot = items
        .iter_mut()
        .find(|item| item.id() == id)
        .ok_or_else(|| LedgerError::not_found(T::KIND, id))?;
    let mut draft = slot.clone();
    mutator(&mut draft);
    draft.set_id(id.to_string());
    draft.validate()?;
    *slot = draft;
    debug!(kind = T::KIND, %id, "record updated");
    Ok(())
}

fn remove_record<T: Record>(items: &mut Vec<T>, id: &str) -> Result<T> {
    let index = items
        .iter()
        .position(|item| item.id() == id)
        .ok_or_else(|| LedgerError::not_found(T::KIND, id))?;
    debug!(kind = T::KIND, %id, "record removed");
    Ok(items.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::fixed::FixedCategory;

    #[test]
    fn add_rejects_invalid_records_without_mutating() {
        let mut ledger = Ledger::new();
        let err = ledger
            .add_variable_expense(VariableExpense::new("2025-03-01", "Food", "", -4.0))
            .expect_err("negative amount must fail");
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(ledger.variable_expenses.is_empty());
    }

    #[test]
    fn add_rejects_duplicate_ids() {
        let mut ledger = Ledger::new();
        let envelope = Envelope::new("Groceries", 200.0);
        let copy = envelope.clone();
        ledger.add_envelope(envelope).unwrap();
        assert!(ledger.add_envelope(copy).is_err());
        assert_eq!(ledger.envelopes.len(), 1);
    }

    #[test]
    fn failed_update_keeps_previous_values() {
        let mut ledger = Ledger::new();
        let id = ledger
            .add_fixed_expense(FixedExpense::new("Rent", FixedCategory::Misc, 800.0))
            .unwrap();
        let err = ledger
            .update_fixed_expense(&id, |expense| expense.amount = 0.0)
            .expect_err("zero amount is invalid");
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(ledger.fixed_expense(&id).unwrap().amount, 800.0);
    }

    #[test]
    fn update_cannot_change_the_id() {
        let mut ledger = Ledger::new();
        let id = ledger.add_envelope(Envelope::new("Fuel", 90.0)).unwrap();
        ledger
            .update_envelope(&id, |envelope| {
                envelope.id = "hijacked".into();
                envelope.budget = 120.0;
            })
            .unwrap();
        assert_eq!(ledger.envelope(&id).unwrap().budget, 120.0);
        assert!(ledger.envelope("hijacked").is_none());
    }

    #[test]
    fn remove_reports_missing_ids() {
        let mut ledger = Ledger::new();
        let err = ledger.remove_savings_goal("ghost").unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { kind: "Savings goal", .. }));
    }

    #[test]
    fn deposit_requires_positive_amount_and_known_goal() {
        let mut ledger = Ledger::new();
        let id = ledger
            .add_savings_goal(SavingsGoal::new("Bike", 500.0, 0.0))
            .unwrap();
        assert_eq!(ledger.deposit(&id, 120.0).unwrap(), 120.0);
        assert_eq!(ledger.withdraw(&id, 200.0).unwrap(), -80.0);
        assert!(ledger.deposit(&id, 0.0).is_err());
        assert!(ledger.deposit("missing", 10.0).is_err());
    }

    #[test]
    fn blank_note_clears_month() {
        let mut ledger = Ledger::new();
        let march: MonthKey = "2025-03".parse().unwrap();
        ledger.set_note(march, "Pay the car tax");
        assert_eq!(ledger.note(march), Some("Pay the car tax"));
        ledger.set_note(march, "   ");
        assert_eq!(ledger.note(march), None);
    }
}
