use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::ImportMode;
use crate::errors::Result;
use crate::ledger::{migration, Ledger, Record};
use crate::utils::write_atomic;

const NOTE_KIND: &str = "Monthly note";

/// Answer to an id collision during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Keep,
    Replace,
}

/// Both sides of a record present in the snapshot and in the import under the same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub kind: &'static str,
    pub id: String,
    pub existing: String,
    pub incoming: String,
}

/// Decides, collision by collision, which version of a record survives a merge.
pub trait CollisionResolver {
    fn resolve(&mut self, collision: &Collision) -> Resolution;
}

impl<F> CollisionResolver for F
where
    F: FnMut(&Collision) -> Resolution,
{
    fn resolve(&mut self, collision: &Collision) -> Resolution {
        self(collision)
    }
}

/// Gives the same answer to every collision.
#[derive(Debug, Clone, Copy)]
pub struct BlanketResolver(pub Resolution);

impl CollisionResolver for BlanketResolver {
    fn resolve(&mut self, _collision: &Collision) -> Resolution {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonImportReport {
    pub added: usize,
    pub replaced: usize,
    pub kept: usize,
    pub unchanged: usize,
    pub base_income_replaced: bool,
    pub migrations: Vec<String>,
    pub warnings: Vec<String>,
}

/// Pretty-printed snapshot, identical to the persisted format.
pub fn export_json(ledger: &Ledger) -> Result<String> {
    Ok(serde_json::to_string_pretty(ledger)?)
}

pub fn export_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    let json = export_json(ledger)?;
    write_atomic(path, &json)?;
    info!(path = %path.display(), "snapshot exported");
    Ok(())
}

/// Imports snapshot text into a copy of `ledger` and returns the copy. `ledger` itself is never
/// touched, so a failed import leaves the caller's state as it was.
///
/// Overwrite replaces the whole snapshot. Merge combines collections by id: existing order is
/// kept, new records are appended and each differing collision is put to `resolver`. Base income
/// is replaced only when the import carries it; monthly notes merge by month.
pub fn import_json(
    ledger: &Ledger,
    text: &str,
    mode: ImportMode,
    resolver: &mut dyn CollisionResolver,
) -> Result<(Ledger, JsonImportReport)> {
    let value: Value = serde_json::from_str(text)?;
    let carries_base_income = value
        .get("ingresosBase")
        .is_some_and(|income| !income.is_null());
    let decoded = migration::decode_value(value)?;
    let mut report = JsonImportReport {
        migrations: decoded.migrations,
        warnings: decoded.warnings,
        ..JsonImportReport::default()
    };
    let incoming = decoded.ledger;

    let merged = match mode {
        ImportMode::Overwrite => {
            report.added = incoming.record_count();
            report.base_income_replaced = true;
            incoming
        }
        ImportMode::Merge => {
            let mut target = ledger.clone();
            if carries_base_income {
                target.base_income = incoming.base_income;
                report.base_income_replaced = true;
            }
            merge_records(
                &mut target.fixed_expenses,
                incoming.fixed_expenses,
                resolver,
                &mut report,
            );
            merge_records(
                &mut target.envelopes,
                incoming.envelopes,
                resolver,
                &mut report,
            );
            merge_records(
                &mut target.savings_goals,
                incoming.savings_goals,
                resolver,
                &mut report,
            );
            merge_records(
                &mut target.one_off_incomes,
                incoming.one_off_incomes,
                resolver,
                &mut report,
            );
            merge_records(
                &mut target.variable_expenses,
                incoming.variable_expenses,
                resolver,
                &mut report,
            );
            for (month, text) in incoming.notes {
                match target.notes.get(&month) {
                    None => {
                        target.notes.insert(month, text);
                        report.added += 1;
                    }
                    Some(existing) if *existing == text => report.unchanged += 1,
                    Some(existing) => {
                        let collision = Collision {
                            kind: NOTE_KIND,
                            id: month.clone(),
                            existing: existing.clone(),
                            incoming: text.clone(),
                        };
                        match resolver.resolve(&collision) {
                            Resolution::Keep => report.kept += 1,
                            Resolution::Replace => {
                                target.notes.insert(month, text);
                                report.replaced += 1;
                            }
                        }
                    }
                }
            }
            target
        }
    };

    info!(
        ?mode,
        added = report.added,
        replaced = report.replaced,
        kept = report.kept,
        "snapshot imported"
    );
    Ok((merged, report))
}

pub fn import_from_path(
    ledger: &Ledger,
    path: &Path,
    mode: ImportMode,
    resolver: &mut dyn CollisionResolver,
) -> Result<(Ledger, JsonImportReport)> {
    let text = fs::read_to_string(path)?;
    import_json(ledger, &text, mode, resolver)
}

fn merge_records<T>(
    existing: &mut Vec<T>,
    incoming: Vec<T>,
    resolver: &mut dyn CollisionResolver,
    report: &mut JsonImportReport,
) where
    T: Record + PartialEq,
{
    for record in incoming {
        let Some(slot) = existing.iter_mut().find(|current| current.id() == record.id()) else {
            existing.push(record);
            report.added += 1;
            continue;
        };
        if *slot == record {
            report.unchanged += 1;
            continue;
        }
        let collision = Collision {
            kind: T::KIND,
            id: record.id().to_string(),
            existing: slot.describe(),
            incoming: record.describe(),
        };
        match resolver.resolve(&collision) {
            Resolution::Keep => report.kept += 1,
            Resolution::Replace => {
                *slot = record;
                report.replaced += 1;
            }
        }
    }
}
