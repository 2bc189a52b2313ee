use serde::{Deserialize, Serialize};

use crate::ledger::{Amounted, FixedExpense, Ledger, MonthKey, OneOffIncome, VariableExpense};

/// How the month balance treats money set aside in savings goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePolicy {
    /// `income - expense`.
    #[default]
    IncomeMinusExpense,
    /// `income - expense - total savings balance`.
    SubtractSavings,
}

/// Every month-scoped aggregate in one value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: MonthKey,
    pub base_income: f64,
    pub one_off_income: f64,
    pub total_income: f64,
    pub fixed_expense: f64,
    pub variable_expense: f64,
    pub total_expense: f64,
    pub savings_balance: f64,
    pub balance: f64,
    pub policy: BalancePolicy,
}

pub struct SummaryService;

impl SummaryService {
    pub fn total_base_income(ledger: &Ledger) -> f64 {
        ledger.base_income.total()
    }

    pub fn total_one_off_income(ledger: &Ledger, month: MonthKey) -> f64 {
        sum_amounts(Self::one_off_incomes(ledger, month))
    }

    pub fn total_fixed_expense(ledger: &Ledger, month: MonthKey) -> f64 {
        sum_amounts(Self::active_fixed_expenses(ledger, month))
    }

    pub fn total_variable_expense(ledger: &Ledger, month: MonthKey) -> f64 {
        sum_amounts(Self::variable_expenses(ledger, month))
    }

    pub fn total_income(ledger: &Ledger, month: MonthKey) -> f64 {
        Self::total_base_income(ledger) + Self::total_one_off_income(ledger, month)
    }

    pub fn total_expense(ledger: &Ledger, month: MonthKey) -> f64 {
        Self::total_fixed_expense(ledger, month) + Self::total_variable_expense(ledger, month)
    }

    pub fn total_savings_balance(ledger: &Ledger) -> f64 {
        ledger.savings_goals.iter().map(|goal| goal.balance).sum()
    }

    pub fn balance(ledger: &Ledger, month: MonthKey, policy: BalancePolicy) -> f64 {
        let net = Self::total_income(ledger, month) - Self::total_expense(ledger, month);
        match policy {
            BalancePolicy::IncomeMinusExpense => net,
            BalancePolicy::SubtractSavings => net - Self::total_savings_balance(ledger),
        }
    }

    pub fn month_summary(ledger: &Ledger, month: MonthKey, policy: BalancePolicy) -> MonthSummary {
        let base_income = Self::total_base_income(ledger);
        let one_off_income = Self::total_one_off_income(ledger, month);
        let fixed_expense = Self::total_fixed_expense(ledger, month);
        let variable_expense = Self::total_variable_expense(ledger, month);
        let savings_balance = Self::total_savings_balance(ledger);
        let total_income = base_income + one_off_income;
        let total_expense = fixed_expense + variable_expense;
        let balance = match policy {
            BalancePolicy::IncomeMinusExpense => total_income - total_expense,
            BalancePolicy::SubtractSavings => total_income - total_expense - savings_balance,
        };
        MonthSummary {
            month,
            base_income,
            one_off_income,
            total_income,
            fixed_expense,
            variable_expense,
            total_expense,
            savings_balance,
            balance,
            policy,
        }
    }

    pub fn one_off_incomes(ledger: &Ledger, month: MonthKey) -> Vec<&OneOffIncome> {
        ledger
            .one_off_incomes
            .iter()
            .filter(|income| month.contains_date_str(&income.date))
            .collect()
    }

    pub fn variable_expenses(ledger: &Ledger, month: MonthKey) -> Vec<&VariableExpense> {
        ledger
            .variable_expenses
            .iter()
            .filter(|expense| month.contains_date_str(&expense.date))
            .collect()
    }

    pub fn active_fixed_expenses(ledger: &Ledger, month: MonthKey) -> Vec<&FixedExpense> {
        ledger
            .fixed_expenses
            .iter()
            .filter(|expense| expense.is_active(month))
            .collect()
    }
}

fn sum_amounts<T: Amounted>(items: Vec<&T>) -> f64 {
    items
        .into_iter()
        .map(|item| item.amount())
        .filter(|amount| amount.is_finite())
        .sum()
}
