use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::services::{BalancePolicy, DepositPolicy},
    errors::{LedgerError, Result},
    interchange::{CsvImportOptions, CsvMode, Resolution},
    utils::{ensure_dir, paths, write_atomic},
};

/// How merge-import collisions are settled when nobody is asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Ask per collision in interactive sessions; keep existing data otherwise.
    #[default]
    Ask,
    KeepExisting,
    ReplaceExisting,
}

impl MergeStrategy {
    /// The fixed answer for non-interactive use.
    pub fn blanket(self) -> Resolution {
        match self {
            MergeStrategy::Ask | MergeStrategy::KeepExisting => Resolution::Keep,
            MergeStrategy::ReplaceExisting => Resolution::Replace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub balance_policy: BalancePolicy,
    pub deposit_policy: DepositPolicy,
    /// Category of the expense recorded by a deposit under [`DepositPolicy::RecordExpense`].
    pub savings_expense_category: String,
    pub csv: CsvImportOptions,
    pub merge: MergeStrategy,
    pub currency: String,
    pub locale: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            balance_policy: BalancePolicy::default(),
            deposit_policy: DepositPolicy::default(),
            savings_expense_category: "Savings".into(),
            csv: CsvImportOptions::default(),
            merge: MergeStrategy::default(),
            currency: "EUR".into(),
            locale: "es-ES".into(),
        }
    }
}

pub const CONFIG_KEYS: [&str; 7] = [
    "balance_policy",
    "deposit_policy",
    "savings_expense_category",
    "csv_mode",
    "merge",
    "currency",
    "locale",
];

impl Config {
    /// `(key, value)` pairs for display, in [`CONFIG_KEYS`] order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("balance_policy", enum_label(&self.balance_policy)),
            ("deposit_policy", enum_label(&self.deposit_policy)),
            ("savings_expense_category", self.savings_expense_category.clone()),
            ("csv_mode", enum_label(&self.csv.mode)),
            ("merge", enum_label(&self.merge)),
            ("currency", self.currency.clone()),
            ("locale", self.locale.clone()),
        ]
    }

    /// Updates one setting from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "balance_policy" => self.balance_policy = parse_enum(key, value)?,
            "deposit_policy" => self.deposit_policy = parse_enum(key, value)?,
            "csv_mode" => self.csv.mode = parse_enum::<CsvMode>(key, value)?,
            "merge" => self.merge = parse_enum(key, value)?,
            "savings_expense_category" | "currency" | "locale" => {
                if value.is_empty() {
                    return Err(LedgerError::Config(format!("{key} cannot be empty")));
                }
                let slot = match key {
                    "savings_expense_category" => &mut self.savings_expense_category,
                    "currency" => &mut self.currency,
                    _ => &mut self.locale,
                };
                *slot = value.to_string();
            }
            other => {
                return Err(LedgerError::Config(format!(
                    "unknown setting `{other}` (expected one of: {})",
                    CONFIG_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Locales whose language writes decimals with a comma.
    pub fn uses_decimal_comma(&self) -> bool {
        let language = self
            .locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        matches!(
            language.as_str(),
            "es" | "fr" | "de" | "it" | "pt" | "nl" | "ca"
        )
    }
}

fn enum_label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(label)) => label,
        _ => String::new(),
    }
}

fn parse_enum<T: for<'de> Deserialize<'de>>(key: &str, value: &str) -> Result<T> {
    let normalized = value.to_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|_| LedgerError::Config(format!("invalid value `{value}` for {key}")))
}

/// Loads and saves `<data dir>/config.json`.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::from_base(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: paths::config_file_in(&base),
        })
    }

    /// Missing file means defaults; an unreadable one is a [`LedgerError::Config`].
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            LedgerError::Config(format!("{} is not valid: {err}", self.path.display()))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
