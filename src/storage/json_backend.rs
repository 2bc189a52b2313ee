use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{
    errors::{LedgerError, Result},
    ledger::{migration, Ledger, LoadReport, CURRENT_SCHEMA_VERSION},
    utils::{ensure_dir, paths, write_atomic},
};

use super::StorageBackend;

const BACKUP_EXTENSION: &str = "json";
const BACKUP_PREFIX: &str = "ledger";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
pub const DEFAULT_RETENTION: usize = 5;

/// Stores the snapshot as `<root>/ledger.json` with rolling copies under `<root>/backups/`.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    ledger_file: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let root = paths::resolve_base(root);
        ensure_dir(&root)?;
        let backups_dir = paths::backup_dir_in(&root);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            ledger_file: paths::ledger_file_in(&root),
            backups_dir,
            root,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_file
    }

    pub fn backup_path(&self, backup_name: &str) -> PathBuf {
        self.backups_dir.join(backup_name)
    }

    /// Millisecond stamp for the next backup, strictly later than every existing one so that
    /// quick successive saves never share a file name.
    fn next_backup_stamp(&self) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        let now = now
            .with_nanosecond(now.nanosecond() / 1_000_000 * 1_000_000)
            .unwrap_or(now);
        let newest = self
            .list_backups()?
            .iter()
            .filter_map(|name| parse_backup_timestamp(name))
            .max();
        Ok(match newest {
            Some(newest) if newest >= now => newest + Duration::milliseconds(1),
            _ => now,
        })
    }

    fn backup_name(stamp: DateTime<Utc>, note: Option<&str>) -> String {
        let timestamp = stamp.format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{}_{}", BACKUP_PREFIX, timestamp);
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        format!("{}.{}", stem, BACKUP_EXTENSION)
    }

    /// Copies the current file aside before it is overwritten.
    fn backup_existing_file(&self) -> Result<()> {
        if !self.ledger_file.exists() {
            return Ok(());
        }
        ensure_dir(&self.backups_dir)?;
        let target = self
            .backups_dir
            .join(Self::backup_name(self.next_backup_stamp()?, None));
        fs::copy(&self.ledger_file, &target)?;
        debug!(path = %target.display(), "previous snapshot backed up");
        self.prune_backups()
    }

    fn prune_backups(&self) -> Result<()> {
        let backups = self.list_backups()?;
        for name in backups.iter().skip(self.retention) {
            let _ = fs::remove_file(self.backup_path(name));
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self) -> Result<LoadReport> {
        if !self.ledger_file.exists() {
            return Ok(LoadReport {
                ledger: Ledger::new(),
                warnings: Vec::new(),
                migrations: Vec::new(),
                schema_version: CURRENT_SCHEMA_VERSION,
            });
        }
        let report = load_ledger_from_path(&self.ledger_file)?;
        info!(
            path = %self.ledger_file.display(),
            records = report.ledger.record_count(),
            "snapshot loaded"
        );
        Ok(report)
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        self.backup_existing_file()?;
        save_ledger_to_path(ledger, &self.ledger_file)?;
        debug!(path = %self.ledger_file.display(), "snapshot saved");
        Ok(())
    }

    fn backup(&self, ledger: &Ledger, note: Option<&str>) -> Result<PathBuf> {
        ensure_dir(&self.backups_dir)?;
        let path = self
            .backups_dir
            .join(Self::backup_name(self.next_backup_stamp()?, note));
        save_ledger_to_path(ledger, &path)?;
        self.prune_backups()?;
        info!(path = %path.display(), "backup written");
        Ok(path)
    }

    fn list_backups(&self) -> Result<Vec<String>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by(|a, b| {
            parse_backup_timestamp(b)
                .cmp(&parse_backup_timestamp(a))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    fn restore(&self, backup_name: &str) -> Result<LoadReport> {
        if backup_name.contains(['/', '\\']) || backup_name.starts_with('.') {
            return Err(LedgerError::validation(format!(
                "`{backup_name}` is not a backup name"
            )));
        }
        if !self.list_backups()?.iter().any(|name| name == backup_name) {
            return Err(LedgerError::Persistence(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let backup_path = self.backup_path(backup_name);
        let report = load_ledger_from_path(&backup_path)?;
        self.save(&report.ledger)?;
        info!(backup = backup_name, "snapshot restored");
        Ok(report)
    }
}

pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    write_atomic(path, &json)
}

pub fn load_ledger_from_path(path: &Path) -> Result<LoadReport> {
    let data = fs::read_to_string(path)?;
    migration::decode_str(&data)
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Reads the `YYYYMMDD_HHMMSSmmm` part of `ledger_<date>_<time>[_note].json`. Second-precision
/// names without the millisecond digits are still recognized.
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let mut parts = stem.split('_');
    if parts.next()? != BACKUP_PREFIX {
        return None;
    }
    let date_part = parts.next()?;
    let time_part = parts.next()?;
    if !is_digits(date_part, 8) || !(is_digits(time_part, 6) || is_digits(time_part, 9)) {
        return None;
    }
    let (seconds, millis) = time_part.split_at(6);
    let millis = if millis.is_empty() { 0 } else { millis.parse::<i64>().ok()? };
    NaiveDateTime::parse_from_str(&format!("{date_part}{seconds}"), "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| {
            DateTime::from_naive_utc_and_offset(naive, Utc) + Duration::milliseconds(millis)
        })
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}
