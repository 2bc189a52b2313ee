#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use family_ledger::{
    config::{Config, ConfigManager},
    core::ledger_manager::LedgerManager,
    ledger::{
        BaseIncome, Envelope, FixedCategory, FixedExpense, Ledger, MonthKey, OneOffIncome,
        SavingsGoal, VariableExpense,
    },
    storage::json_backend::JsonStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates isolated managers backed by unique directories for each test.
pub fn setup_test_env() -> (LedgerManager, ConfigManager) {
    setup_with_config(Config::default())
}

pub fn setup_with_config(config: Config) -> (LedgerManager, ConfigManager) {
    let base = temp_base();
    let storage =
        JsonStorage::new(Some(base.clone()), Some(3)).expect("create json storage backend");
    let (ledger_manager, _) =
        LedgerManager::open(Box::new(storage), config).expect("open ledger manager");
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");
    (ledger_manager, config_manager)
}

pub fn month(raw: &str) -> MonthKey {
    raw.parse().expect("valid month")
}

/// Two earners, a bonus in March, rent, a loan that ended in February and a few expenses.
pub fn household() -> Ledger {
    let mut ledger = Ledger::new();
    ledger.set_base_income(BaseIncome::new(2000.0, 1500.0, 0.0));
    ledger
        .add_one_off_income(OneOffIncome::new("2025-03-05", "Bonus", 300.0))
        .unwrap();
    ledger
        .add_fixed_expense(FixedExpense::new("Rent", FixedCategory::Misc, 800.0))
        .unwrap();
    ledger
        .add_fixed_expense(
            FixedExpense::new("Car loan", FixedCategory::Loans, 150.0).ending(month("2025-02")),
        )
        .unwrap();
    ledger
        .add_variable_expense(VariableExpense::new("2025-03-10", "Food", "Market", 50.0))
        .unwrap();
    ledger
        .add_variable_expense(VariableExpense::new("2025-02-20", "Food", "Market", 70.0))
        .unwrap();
    ledger.add_envelope(Envelope::new("Food", 55.0)).unwrap();
    ledger
        .add_savings_goal(SavingsGoal::new("Holidays", 1000.0, 400.0))
        .unwrap();
    ledger
}
