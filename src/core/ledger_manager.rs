use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::services::{
    BudgetService, CategoryService, DepositOutcome, EnvelopeReport, GoalProgress, MonthSummary,
    SavingsService, SummaryService,
};
use crate::errors::Result;
use crate::interchange::{
    csv::{self, CsvImportReport},
    json::{self, CollisionResolver, JsonImportReport},
    ImportMode,
};
use crate::ledger::{Ledger, LoadReport, MonthKey};
use crate::storage::StorageBackend;

/// Metadata describing the outcome of a load operation.
#[derive(Debug, Clone, Default)]
pub struct LoadMetadata {
    pub warnings: Vec<String>,
    pub migrations: Vec<String>,
    pub schema_version: u8,
}

/// Facade that owns the snapshot and coordinates it with persistence and configuration.
///
/// Every mutation runs against a copy; the copy is saved and only then becomes current, so a
/// failed command or a failed write leaves the previous snapshot in place.
pub struct LedgerManager {
    ledger: Ledger,
    storage: Box<dyn StorageBackend>,
    config: Config,
    active_month: MonthKey,
}

impl LedgerManager {
    pub fn new(storage: Box<dyn StorageBackend>, config: Config) -> Self {
        Self {
            ledger: Ledger::new(),
            storage,
            config,
            active_month: MonthKey::current(),
        }
    }

    /// Builds a manager over whatever the backend currently stores.
    pub fn open(
        storage: Box<dyn StorageBackend>,
        config: Config,
    ) -> Result<(Self, LoadMetadata)> {
        let mut manager = Self::new(storage, config);
        let metadata = manager.reload()?;
        Ok((manager, metadata))
    }

    pub fn reload(&mut self) -> Result<LoadMetadata> {
        let report = self.storage.load()?;
        Ok(self.apply_load(report))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub fn active_month(&self) -> MonthKey {
        self.active_month
    }

    pub fn set_active_month(&mut self, month: MonthKey) {
        self.active_month = month;
    }

    pub fn shift_month(&mut self, months: i32) -> MonthKey {
        self.active_month = self.active_month.shift(months);
        self.active_month
    }

    /// Runs `action` on a copy of the snapshot, persists the result and commits it.
    pub fn apply<T, F>(&mut self, label: &str, action: F) -> Result<T>
    where
        F: FnOnce(&mut Ledger) -> Result<T>,
    {
        let mut draft = self.ledger.clone();
        let outcome = action(&mut draft)?;
        self.commit(draft)?;
        debug!(command = label, "ledger updated");
        Ok(outcome)
    }

    fn commit(&mut self, ledger: Ledger) -> Result<()> {
        self.storage.save(&ledger)?;
        self.ledger = ledger;
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        self.apply("reset", |ledger| {
            ledger.reset();
            Ok(())
        })?;
        info!("ledger reset");
        Ok(())
    }

    // Queries for the active month.

    pub fn summary(&self) -> MonthSummary {
        SummaryService::month_summary(&self.ledger, self.active_month, self.config.balance_policy)
    }

    pub fn envelope_reports(&self) -> Vec<EnvelopeReport> {
        BudgetService::evaluate_all(&self.ledger, self.active_month)
    }

    pub fn goal_progress(&self) -> Vec<GoalProgress> {
        SavingsService::progress_all(&self.ledger)
    }

    pub fn category_suggestions(&self) -> Vec<String> {
        CategoryService::suggestions(&self.ledger)
    }

    pub fn note(&self) -> Option<&str> {
        self.ledger.note(self.active_month)
    }

    // Commands that depend on configuration.

    pub fn deposit(&mut self, goal_id: &str, amount: f64, date: &str) -> Result<DepositOutcome> {
        let policy = self.config.deposit_policy;
        let category = self.config.savings_expense_category.clone();
        self.apply("deposit", |ledger| {
            SavingsService::deposit(ledger, goal_id, amount, date, policy, &category)
        })
    }

    pub fn withdraw(&mut self, goal_id: &str, amount: f64) -> Result<f64> {
        self.apply("withdraw", |ledger| {
            SavingsService::withdraw(ledger, goal_id, amount)
        })
    }

    // Interchange.

    pub fn export_json(&self) -> Result<String> {
        json::export_json(&self.ledger)
    }

    pub fn export_to_path(&self, path: &Path) -> Result<()> {
        json::export_to_path(&self.ledger, path)
    }

    pub fn import_json(
        &mut self,
        text: &str,
        mode: ImportMode,
        resolver: &mut dyn CollisionResolver,
    ) -> Result<JsonImportReport> {
        let (imported, report) = json::import_json(&self.ledger, text, mode, resolver)?;
        for warning in &report.warnings {
            warn!(%warning, "import normalized");
        }
        self.commit(imported)?;
        Ok(report)
    }

    pub fn import_csv(&mut self, text: &str, mode: ImportMode) -> Result<CsvImportReport> {
        let (imported, report) = csv::import_csv(&self.ledger, text, &self.config.csv, mode)?;
        self.commit(imported)?;
        Ok(report)
    }

    // Backups.

    pub fn backup(&self, note: Option<&str>) -> Result<PathBuf> {
        self.storage.backup(&self.ledger, note)
    }

    pub fn list_backups(&self) -> Result<Vec<String>> {
        self.storage.list_backups()
    }

    pub fn restore_backup(&mut self, backup_name: &str) -> Result<LoadMetadata> {
        let report = self.storage.restore(backup_name)?;
        Ok(self.apply_load(report))
    }

    fn apply_load(&mut self, report: LoadReport) -> LoadMetadata {
        let LoadReport {
            ledger,
            warnings,
            migrations,
            schema_version,
        } = report;
        for migration in &migrations {
            info!(%migration, "snapshot migrated");
        }
        self.ledger = ledger;
        LoadMetadata {
            warnings,
            migrations,
            schema_version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LedgerError;
    use crate::interchange::{BlanketResolver, Resolution};
    use crate::ledger::{Envelope, SavingsGoal, VariableExpense};
    use crate::storage::JsonStorage;
    use std::fs;
    use tempfile::tempdir;

    fn manager_in(dir: &Path) -> LedgerManager {
        let storage = JsonStorage::new(Some(dir.to_path_buf()), Some(3)).unwrap();
        let (manager, _) = LedgerManager::open(Box::new(storage), Config::default()).unwrap();
        manager
    }

    #[test]
    fn mutations_are_persisted() {
        let temp = tempdir().unwrap();
        let mut manager = manager_in(temp.path());
        let id = manager
            .apply("add envelope", |ledger| {
                ledger.add_envelope(Envelope::new("Food", 150.0))
            })
            .unwrap();

        let reopened = manager_in(temp.path());
        assert_eq!(reopened.ledger().envelope(&id).unwrap().budget, 150.0);
    }

    #[test]
    fn failed_mutation_leaves_snapshot_untouched() {
        let temp = tempdir().unwrap();
        let mut manager = manager_in(temp.path());
        let before = manager.ledger().clone();
        let err = manager
            .apply("add expense", |ledger| {
                ledger.add_variable_expense(VariableExpense::new("2025-03-01", "Food", "", 5.0))?;
                ledger.add_variable_expense(VariableExpense::new("", "Food", "", 5.0))
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(manager.ledger(), &before);
        assert!(!temp.path().join("ledger.json").exists());
    }

    #[test]
    fn rejects_future_schema_versions() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("ledger.json"), r#"{"schemaVersion": 42}"#).unwrap();
        let storage = JsonStorage::new(Some(temp.path().to_path_buf()), None).unwrap();
        let err = LedgerManager::open(Box::new(storage), Config::default())
            .err()
            .expect("future schema should fail");
        match err {
            LedgerError::MalformedInput(message) => {
                assert!(message.contains("newer"), "unexpected error: {message}");
            }
            other => panic!("expected malformed input, got {other:?}"),
        }
    }

    #[test]
    fn failed_import_keeps_previous_state() {
        let temp = tempdir().unwrap();
        let mut manager = manager_in(temp.path());
        manager
            .apply("add goal", |ledger| {
                ledger.add_savings_goal(SavingsGoal::new("Trip", 1000.0, 0.0))
            })
            .unwrap();
        let before = manager.ledger().clone();
        assert!(manager
            .import_json(
                "not json",
                ImportMode::Overwrite,
                &mut BlanketResolver(Resolution::Keep)
            )
            .is_err());
        assert!(manager.import_csv("fecha;importe\n", ImportMode::Overwrite).is_err());
        assert_eq!(manager.ledger(), &before);
    }

    #[test]
    fn month_navigation_wraps_years() {
        let temp = tempdir().unwrap();
        let mut manager = manager_in(temp.path());
        manager.set_active_month(MonthKey::new(2025, 1).unwrap());
        assert_eq!(manager.shift_month(-1), MonthKey::new(2024, 12).unwrap());
        assert_eq!(manager.shift_month(2), MonthKey::new(2025, 2).unwrap());
    }

    #[test]
    fn legacy_file_reports_migration() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("ledger.json"),
            r#"{"fijos":[{"id":1,"nombre":"Rent","importe":800}]}"#,
        )
        .unwrap();
        let storage = JsonStorage::new(Some(temp.path().to_path_buf()), None).unwrap();
        let (manager, metadata) =
            LedgerManager::open(Box::new(storage), Config::default()).unwrap();
        assert_eq!(metadata.schema_version, 0);
        assert_eq!(metadata.migrations.len(), 1);
        assert_eq!(manager.ledger().fixed_expenses.len(), 1);
    }
}
