pub mod json_backend;

use std::path::PathBuf;

use crate::errors::Result;
use crate::ledger::{Ledger, LoadReport};

/// Abstraction over persistence backends capable of storing the household snapshot.
pub trait StorageBackend: Send + Sync {
    /// Loads the stored snapshot; a backend with nothing stored yields an empty ledger.
    fn load(&self) -> Result<LoadReport>;
    /// Replaces the stored snapshot. Implementations must never leave a partial write behind.
    fn save(&self, ledger: &Ledger) -> Result<()>;
    /// Writes a labelled copy of `ledger` next to the rolling backups.
    fn backup(&self, ledger: &Ledger, note: Option<&str>) -> Result<PathBuf>;
    /// Backup file names, newest first.
    fn list_backups(&self) -> Result<Vec<String>>;
    fn restore(&self, backup_name: &str) -> Result<LoadReport>;
}

pub use json_backend::JsonStorage;
