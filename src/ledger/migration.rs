//! Versioned snapshot decoding: raw JSON is migrated to the current schema, decoded leniently and
//! then normalized so every record carries a unique id.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::warn;

use super::{
    common::{new_id, Record},
    fixed::FixedCategory,
    ledger::{Ledger, CURRENT_SCHEMA_VERSION},
};
use crate::errors::{LedgerError, Result};

const SCHEMA_VERSION_KEY: &str = "schemaVersion";

/// Outcome of decoding a snapshot.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub ledger: Ledger,
    pub warnings: Vec<String>,
    pub migrations: Vec<String>,
    /// Schema version found in the source before migration.
    pub schema_version: u8,
}

/// Parses snapshot text and runs it through [`decode_value`].
pub fn decode_str(raw: &str) -> Result<LoadReport> {
    let value: Value = serde_json::from_str(raw)?;
    decode_value(value)
}

pub fn decode_value(value: Value) -> Result<LoadReport> {
    let (value, source_version, migrations) = migrate(value)?;
    let mut ledger: Ledger = serde_json::from_value(value)?;
    ledger.schema_version = CURRENT_SCHEMA_VERSION;
    let warnings = normalize_ids(&mut ledger);
    for warning in &warnings {
        warn!(%warning, "snapshot normalized");
    }
    Ok(LoadReport {
        ledger,
        warnings,
        migrations,
        schema_version: source_version,
    })
}

/// Upgrades a raw snapshot to [`CURRENT_SCHEMA_VERSION`], returning the migrated value, the
/// version it started at and a description of each step applied.
pub fn migrate(value: Value) -> Result<(Value, u8, Vec<String>)> {
    let Value::Object(mut root) = value else {
        return Err(LedgerError::malformed("snapshot must be a JSON object"));
    };
    let source_version = schema_version_of(&root)?;
    if source_version > CURRENT_SCHEMA_VERSION {
        return Err(LedgerError::malformed(format!(
            "snapshot schema v{} is newer than supported v{}",
            source_version, CURRENT_SCHEMA_VERSION
        )));
    }

    let mut migrations = Vec::new();
    let mut version = source_version;
    while version < CURRENT_SCHEMA_VERSION {
        if version == 0 {
            let patched = default_fixed_categories(&mut root);
            migrations.push(format!(
                "v0 -> v1: assigned category {} to {} fixed expense(s)",
                FixedCategory::Misc,
                patched
            ));
        }
        version += 1;
    }
    root.insert(SCHEMA_VERSION_KEY.into(), Value::from(CURRENT_SCHEMA_VERSION));
    Ok((Value::Object(root), source_version, migrations))
}

fn schema_version_of(root: &Map<String, Value>) -> Result<u8> {
    match root.get(SCHEMA_VERSION_KEY) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|version| u8::try_from(version).ok())
            .ok_or_else(|| LedgerError::malformed(format!("invalid schema version {number}"))),
        Some(other) => Err(LedgerError::malformed(format!(
            "invalid schema version {other}"
        ))),
    }
}

fn default_fixed_categories(root: &mut Map<String, Value>) -> usize {
    let Some(Value::Array(items)) = root.get_mut("fijos") else {
        return 0;
    };
    let mut patched = 0;
    for item in items.iter_mut() {
        if let Value::Object(fields) = item {
            let missing = matches!(fields.get("categoria"), None | Some(Value::Null));
            if missing {
                fields.insert(
                    "categoria".into(),
                    Value::from(FixedCategory::Misc.to_string()),
                );
                patched += 1;
            }
        }
    }
    patched
}

/// Assigns fresh ids to records whose id is blank or repeats an earlier one in the same
/// collection. Returns one warning per reassigned id.
pub fn normalize_ids(ledger: &mut Ledger) -> Vec<String> {
    let mut warnings = Vec::new();
    normalize_collection(&mut ledger.one_off_incomes, &mut warnings);
    normalize_collection(&mut ledger.fixed_expenses, &mut warnings);
    normalize_collection(&mut ledger.variable_expenses, &mut warnings);
    normalize_collection(&mut ledger.envelopes, &mut warnings);
    normalize_collection(&mut ledger.savings_goals, &mut warnings);
    warnings
}

fn normalize_collection<T: Record>(items: &mut [T], warnings: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for item in items.iter_mut() {
        let current = item.id().trim().to_string();
        if current.is_empty() {
            let fresh = new_id();
            warnings.push(format!("{} without id assigned {}", T::KIND, fresh));
            item.set_id(fresh.clone());
            seen.insert(fresh);
        } else if !seen.insert(current.clone()) {
            let fresh = new_id();
            warnings.push(format!(
                "{} id `{}` was duplicated; reassigned {}",
                T::KIND,
                current,
                fresh
            ));
            item.set_id(fresh.clone());
            seen.insert(fresh);
        }
    }
}
