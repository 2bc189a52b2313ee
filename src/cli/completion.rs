use std::collections::BTreeMap;

use crate::cli::commands::CommandSet;
use crate::config::CONFIG_KEYS;
use crate::core::services::CategoryService;
use crate::ledger::{FixedCategory, Identifiable, Ledger};

/// One word position of a usage form.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    /// Subcommand or keyword typed as written, e.g. `add` or `end`.
    Literal(String),
    /// Closed set such as `merge|overwrite`; upper-case parts like `YYYY-MM` are not offered.
    Choice(Vec<String>),
    /// Free value named by its placeholder, e.g. `id` or `category`.
    Value(String),
}

impl Slot {
    fn parse(token: &str) -> Self {
        let inner = token.trim_matches(|ch: char| matches!(ch, '[' | ']' | '<' | '>'));
        if inner.contains('|') {
            Slot::Choice(
                inner
                    .split('|')
                    .filter(|word| is_keyword(word))
                    .map(str::to_string)
                    .collect(),
            )
        } else if token.contains('<') {
            Slot::Value(inner.trim_end_matches("...").to_string())
        } else {
            Slot::Literal(inner.to_string())
        }
    }

    fn accepts(&self, word: &str) -> bool {
        match self {
            Slot::Literal(literal) => literal.eq_ignore_ascii_case(word),
            Slot::Choice(_) | Slot::Value(_) => true,
        }
    }
}

fn is_keyword(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|ch| ch.is_ascii_lowercase() || ch == '-')
}

/// Usage forms of a command, without the leading command name.
fn usage_forms(name: &str, usage: &str) -> Vec<Vec<Slot>> {
    let body = usage.strip_prefix(name).unwrap_or(usage).trim_start();
    body.split(" | ")
        .map(|form| form.split_whitespace().map(Slot::parse).collect())
        .collect()
}

/// Snapshot of what Tab can offer: command grammar plus the ids, categories and backups of the
/// ledger as it was before the current prompt.
#[derive(Debug, Default)]
pub struct CompletionIndex {
    commands: Vec<(&'static str, Vec<Vec<Slot>>)>,
    ids: BTreeMap<&'static str, Vec<String>>,
    categories: Vec<String>,
    backups: Vec<String>,
}

impl CompletionIndex {
    pub fn new(commands: &CommandSet) -> Self {
        Self {
            commands: commands
                .iter()
                .map(|entry| (entry.name, usage_forms(entry.name, entry.usage)))
                .collect(),
            ..Self::default()
        }
    }

    pub fn refresh(&mut self, ledger: &Ledger, backups: Vec<String>) {
        fn ids<T: Identifiable>(records: &[T]) -> Vec<String> {
            records.iter().map(|record| record.id().to_string()).collect()
        }

        self.ids = BTreeMap::from([
            ("income", ids(&ledger.one_off_incomes)),
            ("fixed", ids(&ledger.fixed_expenses)),
            ("expense", ids(&ledger.variable_expenses)),
            ("envelope", ids(&ledger.envelopes)),
            ("goal", ids(&ledger.savings_goals)),
        ]);
        self.categories = CategoryService::suggestions(ledger);
        self.backups = backups;
    }

    /// Candidates for the word that ends `prefix`, with the byte offset where that word starts.
    /// Values containing spaces come back quoted.
    pub fn complete(&self, prefix: &str) -> (usize, Vec<String>) {
        let start = prefix
            .char_indices()
            .rev()
            .find(|(_, ch)| ch.is_whitespace())
            .map_or(0, |(idx, ch)| idx + ch.len_utf8());
        let needle = prefix[start..].trim_start_matches('"').to_lowercase();
        let words: Vec<&str> = prefix[..start].split_whitespace().collect();

        let candidates = match words.split_first() {
            None => self.commands.iter().map(|(name, _)| name.to_string()).collect(),
            Some((command, args)) => self.argument_candidates(command, args),
        };
        let mut matches: Vec<String> = candidates
            .into_iter()
            .filter(|candidate| candidate.to_lowercase().starts_with(&needle))
            .collect();
        matches.sort();
        matches.dedup();
        let matches = matches
            .into_iter()
            .map(|candidate| {
                if candidate.contains(char::is_whitespace) {
                    format!("\"{candidate}\"")
                } else {
                    candidate
                }
            })
            .collect();
        (start, matches)
    }

    fn argument_candidates(&self, command: &str, args: &[&str]) -> Vec<String> {
        let Some((name, forms)) = self
            .commands
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(command))
        else {
            return Vec::new();
        };
        let position = args.len();
        forms
            .iter()
            .filter(|form| {
                form.len() > position
                    && args.iter().zip(form.iter()).all(|(arg, slot)| slot.accepts(arg))
            })
            .flat_map(|form| self.slot_values(name, &form[position]))
            .collect()
    }

    fn slot_values(&self, command: &str, slot: &Slot) -> Vec<String> {
        match slot {
            Slot::Literal(word) => vec![word.clone()],
            Slot::Choice(words) => words.clone(),
            Slot::Value(kind) => match (command, kind.as_str()) {
                (_, "id") => self.ids.get(command).cloned().unwrap_or_default(),
                ("fixed", "category") => FixedCategory::ALL
                    .iter()
                    .map(|category| category.to_string().to_lowercase())
                    .collect(),
                (_, "category" | "prefix") => self.categories.clone(),
                (_, "command") => self
                    .commands
                    .iter()
                    .map(|(name, _)| name.to_string())
                    .collect(),
                (_, "backup") => self.backups.clone(),
                (_, "key") => CONFIG_KEYS.iter().map(|key| key.to_string()).collect(),
                _ => Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Envelope, SavingsGoal, VariableExpense};

    fn index() -> (CompletionIndex, String) {
        let mut ledger = Ledger::new();
        ledger.add_envelope(Envelope::new("Food", 300.0)).unwrap();
        ledger
            .add_variable_expense(VariableExpense::new("2025-03-02", "Kids club", "", 12.5))
            .unwrap();
        let goal = ledger
            .add_savings_goal(SavingsGoal::new("Holidays", 1000.0, 0.0))
            .unwrap();
        let mut index = CompletionIndex::new(&CommandSet::load());
        index.refresh(&ledger, vec!["ledger_20250301_101500000.json".into()]);
        (index, goal)
    }

    #[test]
    fn first_word_completes_command_names() {
        let (index, _) = index();
        let (start, names) = index.complete("ex");
        assert_eq!(start, 0);
        assert_eq!(names, vec!["exit", "expense", "export"]);
    }

    #[test]
    fn subcommands_follow_the_usage_forms() {
        let (index, _) = index();
        let (start, words) = index.complete("goal d");
        assert_eq!(start, 5);
        assert_eq!(words, vec!["deposit"]);
        assert_eq!(index.complete("import data.json ").1, vec!["merge", "overwrite"]);
        assert_eq!(index.complete("month n").1, vec!["next"]);
        assert!(index.complete("summary ").1.is_empty());
    }

    #[test]
    fn record_ids_come_from_the_matching_collection() {
        let (index, goal) = index();
        assert_eq!(index.complete("goal deposit ").1, vec![goal.clone()]);
        assert_eq!(index.complete(&format!("goal edit {goal} n")).1, vec!["name"]);
        assert!(index.complete("envelope remove zz").1.is_empty());
        assert_eq!(index.complete("income remove ").1, Vec::<String>::new());
    }

    #[test]
    fn categories_and_backups_are_offered_by_placeholder() {
        let (index, _) = index();
        assert_eq!(index.complete("expense list ").1, vec!["Food", "\"Kids club\""]);
        assert_eq!(index.complete("expense add 2025-03-09 k").1, vec!["\"Kids club\""]);
        assert_eq!(index.complete("fixed add Rent 800 ut").1, vec!["utilities"]);
        assert_eq!(
            index.complete("backup restore led").1,
            vec!["ledger_20250301_101500000.json"]
        );
        assert_eq!(index.complete("config set cur").1, vec!["currency"]);
        assert_eq!(index.complete("help sum").1, vec!["summary"]);
    }
}
