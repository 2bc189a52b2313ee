use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{LedgerError, Result};
use crate::ledger::{Ledger, Record, SavingsGoal, VariableExpense};

/// Whether a deposit also shows up as spending in the month it was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositPolicy {
    /// Only the goal balance changes.
    #[default]
    BalanceOnly,
    /// The deposit is also recorded as a variable expense on the deposit date.
    RecordExpense,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goal_id: String,
    pub name: String,
    pub balance: f64,
    pub target: f64,
    /// `balance / target`, absent when the goal has no target.
    pub ratio: Option<f64>,
    pub reached: bool,
    pub display_percent: f64,
}

/// Result of a deposit, including the linked expense when one was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositOutcome {
    pub balance: f64,
    pub expense_id: Option<String>,
}

pub struct SavingsService;

impl SavingsService {
    pub fn progress(goal: &SavingsGoal) -> GoalProgress {
        let ratio = goal.has_target().then(|| goal.balance / goal.target);
        GoalProgress {
            goal_id: goal.id.clone(),
            name: goal.name.clone(),
            balance: goal.balance,
            target: goal.target,
            ratio,
            reached: ratio.is_some_and(|ratio| ratio >= 1.0),
            display_percent: ratio.map_or(0.0, |ratio| (ratio * 100.0).clamp(0.0, 100.0)),
        }
    }

    pub fn progress_all(ledger: &Ledger) -> Vec<GoalProgress> {
        ledger.savings_goals.iter().map(Self::progress).collect()
    }

    /// Deposits into a goal. Under [`DepositPolicy::RecordExpense`] the same amount is recorded as
    /// a variable expense dated `date` in `category`; both changes happen or neither does.
    pub fn deposit(
        ledger: &mut Ledger,
        goal_id: &str,
        amount: f64,
        date: &str,
        policy: DepositPolicy,
        category: &str,
    ) -> Result<DepositOutcome> {
        let mut draft = ledger.clone();
        let balance = draft.deposit(goal_id, amount)?;
        let expense_id = match policy {
            DepositPolicy::BalanceOnly => None,
            DepositPolicy::RecordExpense => {
                let goal_name = draft
                    .savings_goal(goal_id)
                    .map(|goal| goal.name.clone())
                    .ok_or_else(|| LedgerError::not_found(SavingsGoal::KIND, goal_id))?;
                let expense = VariableExpense::new(date, category, goal_name, amount);
                Some(draft.add_variable_expense(expense)?)
            }
        };
        *ledger = draft;
        info!(goal = goal_id, amount, balance, ?policy, "deposit recorded");
        Ok(DepositOutcome {
            balance,
            expense_id,
        })
    }

    pub fn withdraw(ledger: &mut Ledger, goal_id: &str, amount: f64) -> Result<f64> {
        let balance = ledger.withdraw(goal_id, amount)?;
        info!(goal = goal_id, amount, balance, "withdrawal recorded");
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_without_target_reports_no_ratio() {
        let goal = SavingsGoal::new("Rainy day", 0.0, 250.0);
        let progress = SavingsService::progress(&goal);
        assert_eq!(progress.ratio, None);
        assert!(!progress.reached);
        assert_eq!(progress.display_percent, 0.0);
    }

    #[test]
    fn reaching_target_marks_goal_reached() {
        let goal = SavingsGoal::new("Bike", 400.0, 500.0);
        let progress = SavingsService::progress(&goal);
        assert_eq!(progress.ratio, Some(1.25));
        assert!(progress.reached);
        assert_eq!(progress.display_percent, 100.0);
    }

    #[test]
    fn record_expense_policy_adds_linked_expense() {
        let mut ledger = Ledger::new();
        let id = ledger
            .add_savings_goal(SavingsGoal::new("Bike", 400.0, 0.0))
            .unwrap();
        let outcome = SavingsService::deposit(
            &mut ledger,
            &id,
            50.0,
            "2025-03-05",
            DepositPolicy::RecordExpense,
            "Savings",
        )
        .unwrap();
        assert_eq!(outcome.balance, 50.0);
        let expense_id = outcome.expense_id.expect("linked expense");
        let expense = ledger.variable_expense(&expense_id).unwrap();
        assert_eq!(expense.category, "Savings");
        assert_eq!(expense.description, "Bike");
        assert_eq!(expense.amount, 50.0);
    }

    #[test]
    fn failed_linked_expense_rolls_back_deposit() {
        let mut ledger = Ledger::new();
        let id = ledger
            .add_savings_goal(SavingsGoal::new("Bike", 400.0, 10.0))
            .unwrap();
        let err = SavingsService::deposit(
            &mut ledger,
            &id,
            50.0,
            "not a date",
            DepositPolicy::RecordExpense,
            "Savings",
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(ledger.savings_goal(&id).unwrap().balance, 10.0);
        assert!(ledger.variable_expenses.is_empty());
    }

    #[test]
    fn balance_only_policy_touches_nothing_else() {
        let mut ledger = Ledger::new();
        let id = ledger
            .add_savings_goal(SavingsGoal::new("Bike", 400.0, 0.0))
            .unwrap();
        let outcome = SavingsService::deposit(
            &mut ledger,
            &id,
            25.0,
            "2025-03-05",
            DepositPolicy::BalanceOnly,
            "Savings",
        )
        .unwrap();
        assert_eq!(outcome.expense_id, None);
        assert!(ledger.variable_expenses.is_empty());
        assert_eq!(SavingsService::withdraw(&mut ledger, &id, 40.0).unwrap(), -15.0);
    }
}
