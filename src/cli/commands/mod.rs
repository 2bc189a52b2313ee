mod config;
mod envelope;
mod expense;
mod fixed;
mod goal;
mod income;
mod interchange;
mod month;
mod system;

use chrono::Local;
use strsim::levenshtein;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::errors::LedgerError;
use crate::interchange::ImportMode;
use crate::ledger::{lenient, MonthKey};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// One shell command. `usage` doubles as the grammar the line completer walks: alternatives are
/// separated by `|`, `<placeholders>` take values and bare words are literal subcommands.
pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

/// Every shell command, in the order `help` lists them.
pub struct CommandSet {
    entries: Vec<CommandEntry>,
}

impl CommandSet {
    pub fn load() -> Self {
        let mut entries = Vec::new();
        entries.extend(system::definitions());
        entries.extend(month::definitions());
        entries.extend(income::definitions());
        entries.extend(fixed::definitions());
        entries.extend(expense::definitions());
        entries.extend(envelope::definitions());
        entries.extend(goal::definitions());
        entries.extend(interchange::definitions());
        entries.extend(config::definitions());
        Self { entries }
    }

    /// Case-insensitive lookup by command name.
    pub fn find(&self, name: &str) -> Option<&CommandEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandEntry> {
        self.entries.iter()
    }

    /// Nearest command name within three edits, for "did you mean" hints.
    pub fn closest(&self, input: &str) -> Option<&'static str> {
        let needle = input.to_lowercase();
        self.entries
            .iter()
            .map(|entry| (levenshtein(entry.name, &needle), entry.name))
            .min_by_key(|(distance, _)| *distance)
            .filter(|(distance, _)| *distance <= 3)
            .map(|(_, name)| name)
    }
}

pub(crate) fn parse_amount(raw: &str) -> Result<f64, CommandError> {
    lenient::parse_amount(raw)
        .ok_or_else(|| CommandError::InvalidArguments(format!("`{raw}` is not a valid amount")))
}

pub(crate) fn parse_month(raw: &str) -> Result<MonthKey, CommandError> {
    MonthKey::parse(raw).ok_or_else(|| {
        CommandError::InvalidArguments(format!("`{raw}` is not a month in YYYY-MM format"))
    })
}

pub(crate) fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_import_mode(raw: Option<&&str>) -> Result<ImportMode, CommandError> {
    match raw.map(|value| value.to_lowercase()).as_deref() {
        None | Some("merge") => Ok(ImportMode::Merge),
        Some("overwrite") => Ok(ImportMode::Overwrite),
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown import mode `{other}` (expected merge or overwrite)"
        ))),
    }
}

/// Joins trailing words into one free-text value.
pub(crate) fn rest(args: &[&str]) -> String {
    args.join(" ")
}

/// Finds the id equal to `needle`, or the only id starting with it.
pub(crate) fn resolve_id<'a, I>(
    kind: &'static str,
    ids: I,
    needle: &str,
) -> Result<String, CommandError>
where
    I: IntoIterator<Item = &'a str>,
{
    let ids: Vec<&str> = ids.into_iter().collect();
    if let Some(exact) = ids.iter().find(|id| **id == needle) {
        return Ok(exact.to_string());
    }
    let matches: Vec<&str> = ids
        .into_iter()
        .filter(|id| !needle.is_empty() && id.starts_with(needle))
        .collect();
    match matches.as_slice() {
        [single] => Ok(single.to_string()),
        [] => Err(LedgerError::not_found(kind, needle).into()),
        _ => Err(CommandError::InvalidArguments(format!(
            "id prefix `{needle}` matches {} records; type more characters",
            matches.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_id_accepts_unique_prefix() {
        let ids = ["abc123", "abd999", "x"];
        assert_eq!(resolve_id("Envelope", ids, "abc").unwrap(), "abc123");
        assert_eq!(resolve_id("Envelope", ids, "x").unwrap(), "x");
        assert!(matches!(
            resolve_id("Envelope", ids, "ab"),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(matches!(
            resolve_id("Envelope", ids, "zzz"),
            Err(CommandError::Ledger(LedgerError::NotFound { .. }))
        ));
    }

    #[test]
    fn lookup_ignores_case_and_suggests_near_misses() {
        let commands = CommandSet::load();
        assert_eq!(commands.find("Summary").map(|entry| entry.name), Some("summary"));
        assert!(commands.find("summarise-all").is_none());
        assert_eq!(commands.closest("sumary"), Some("summary"));
        assert_eq!(commands.closest("xyzzyplugh"), None);
    }

    #[test]
    fn import_mode_defaults_to_merge() {
        assert_eq!(parse_import_mode(None).unwrap(), ImportMode::Merge);
        assert_eq!(
            parse_import_mode(Some(&"OVERWRITE")).unwrap(),
            ImportMode::Overwrite
        );
        assert!(parse_import_mode(Some(&"append")).is_err());
    }
}
