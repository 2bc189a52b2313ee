use dirs::home_dir;
use std::{env, path::PathBuf};

pub const HOME_ENV: &str = "FAMILY_LEDGER_HOME";

const DEFAULT_DIR_NAME: &str = ".family_ledger";
const LEDGER_FILE: &str = "ledger.json";
const BACKUP_DIR: &str = "backups";
const CONFIG_FILE: &str = "config.json";

/// Returns the application data directory, defaulting to `~/.family_ledger`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Resolves an optional override, falling back to [`app_data_dir`].
pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
    custom.unwrap_or_else(app_data_dir)
}

pub fn ledger_file_in(base: &std::path::Path) -> PathBuf {
    base.join(LEDGER_FILE)
}

pub fn backup_dir_in(base: &std::path::Path) -> PathBuf {
    base.join(BACKUP_DIR)
}

pub fn config_file_in(base: &std::path::Path) -> PathBuf {
    base.join(CONFIG_FILE)
}
