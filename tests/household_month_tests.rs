mod common;

use common::{household, month, setup_test_env, setup_with_config};
use family_ledger::{
    config::Config,
    core::services::{
        BalancePolicy, BudgetService, CategoryService, DepositPolicy, EnvelopeStatus,
        SavingsService, SummaryService,
    },
    ledger::{Envelope, SavingsGoal, VariableExpense},
};

#[test]
fn march_summary_counts_only_march_records() {
    let ledger = household();
    let summary = SummaryService::month_summary(
        &ledger,
        month("2025-03"),
        BalancePolicy::IncomeMinusExpense,
    );
    assert_eq!(summary.base_income, 3500.0);
    assert_eq!(summary.one_off_income, 300.0);
    assert_eq!(summary.total_income, 3800.0);
    assert_eq!(summary.fixed_expense, 800.0);
    assert_eq!(summary.variable_expense, 50.0);
    assert_eq!(summary.total_expense, 850.0);
    assert_eq!(summary.balance, 2950.0);
    assert_eq!(summary.savings_balance, 400.0);
}

#[test]
fn ended_fixed_expense_stops_after_its_end_month() {
    let ledger = household();
    let february = SummaryService::active_fixed_expenses(&ledger, month("2025-02"));
    let march = SummaryService::active_fixed_expenses(&ledger, month("2025-03"));
    assert_eq!(february.len(), 2);
    assert_eq!(march.len(), 1);
    assert_eq!(march[0].name, "Rent");
    assert_eq!(
        SummaryService::total_expense(&ledger, month("2025-02")),
        800.0 + 150.0 + 70.0
    );
}

#[test]
fn subtract_savings_policy_changes_only_balance() {
    let ledger = household();
    let march = month("2025-03");
    let plain = SummaryService::month_summary(&ledger, march, BalancePolicy::IncomeMinusExpense);
    let saving = SummaryService::month_summary(&ledger, march, BalancePolicy::SubtractSavings);
    assert_eq!(plain.total_income, saving.total_income);
    assert_eq!(plain.total_expense, saving.total_expense);
    assert_eq!(saving.balance, plain.balance - 400.0);
}

#[test]
fn envelope_status_moves_through_thresholds() {
    let mut ledger = household();
    let food = ledger.envelopes[0].clone();
    let march = month("2025-03");

    // 50 of 55 is above 90%.
    let report = BudgetService::evaluate(&ledger, &food, march);
    assert_eq!(report.status, EnvelopeStatus::Warning);
    assert_eq!(report.spent, 50.0);
    assert!((report.remaining - 5.0).abs() < 1e-9);

    ledger
        .add_variable_expense(VariableExpense::new("2025-03-21", "food", "", 10.0))
        .unwrap();
    let report = BudgetService::evaluate(&ledger, &food, march);
    assert_eq!(report.status, EnvelopeStatus::Over);
    assert_eq!(report.display_percent, 100.0);
    assert!(report.remaining < 0.0);

    let april = BudgetService::evaluate(&ledger, &food, month("2025-04"));
    assert_eq!(april.status, EnvelopeStatus::Good);
    assert_eq!(april.spent, 0.0);
}

#[test]
fn envelope_without_budget_is_undefined() {
    let mut ledger = household();
    let id = ledger.add_envelope(Envelope::new("Kids", 0.0)).unwrap();
    let report = BudgetService::evaluate_by_id(&ledger, &id, month("2025-03")).unwrap();
    assert_eq!(report.status, EnvelopeStatus::UndefinedBudget);
    assert_eq!(report.ratio, None);
    assert!(BudgetService::evaluate_by_id(&ledger, "missing", month("2025-03")).is_err());
}

#[test]
fn goal_progress_and_categories() {
    let ledger = household();
    let progress = SavingsService::progress_all(&ledger);
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].ratio, Some(0.4));
    assert!(!progress[0].reached);

    let mut ledger = ledger;
    ledger
        .add_variable_expense(VariableExpense::new("2025-03-11", " Fuel ", "", 30.0))
        .unwrap();
    assert_eq!(CategoryService::suggestions(&ledger), vec!["Food", "Fuel"]);
    assert_eq!(CategoryService::matching(&ledger, "fu"), vec!["Fuel"]);
}

#[test]
fn manager_deposit_with_expense_policy_is_persisted() {
    let mut config = Config::default();
    config.deposit_policy = DepositPolicy::RecordExpense;
    let (mut manager, _) = setup_with_config(config);
    let goal_id = manager
        .apply("add goal", |ledger| {
            ledger.add_savings_goal(SavingsGoal::new("Bike", 500.0, 0.0))
        })
        .unwrap();
    manager.set_active_month(month("2025-03"));

    let outcome = manager.deposit(&goal_id, 120.0, "2025-03-15").unwrap();
    assert_eq!(outcome.balance, 120.0);
    let expense_id = outcome.expense_id.expect("expense recorded");
    let expense = manager.ledger().variable_expense(&expense_id).unwrap();
    assert_eq!(expense.category, "Savings");
    assert_eq!(expense.description, "Bike");
    assert_eq!(manager.summary().variable_expense, 120.0);

    assert!(manager.deposit(&goal_id, -5.0, "2025-03-15").is_err());
    assert!(manager.deposit("nope", 5.0, "2025-03-15").is_err());
    assert_eq!(manager.ledger().variable_expenses.len(), 1);
}

#[test]
fn default_deposit_only_moves_balance() {
    let (mut manager, _) = setup_test_env();
    let goal_id = manager
        .apply("add goal", |ledger| {
            ledger.add_savings_goal(SavingsGoal::new("Trip", 0.0, 10.0))
        })
        .unwrap();
    let outcome = manager.deposit(&goal_id, 15.0, "2025-03-15").unwrap();
    assert_eq!(outcome.balance, 25.0);
    assert_eq!(outcome.expense_id, None);
    assert_eq!(manager.withdraw(&goal_id, 40.0).unwrap(), -15.0);
    assert!(manager.ledger().variable_expenses.is_empty());
}
