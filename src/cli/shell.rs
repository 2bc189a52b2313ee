use std::io::{self, BufRead};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::completion::CompletionIndex;
use crate::cli::core::{CliError, CliMode, LoopControl, ShellContext};
use crate::cli::io as cli_io;

/// Set to run the shell non-interactively over stdin.
pub const SCRIPT_ENV: &str = "FAMILY_LEDGER_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = match std::env::var_os(SCRIPT_ENV) {
        Some(_) => CliMode::Script,
        None => CliMode::Interactive,
    };
    let mut context = ShellContext::new(mode)?;
    tracing::debug!(?mode, "shell started");

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context, io::stdin().lock()),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<LedgerHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(LedgerHelper {
        index: CompletionIndex::new(&context.commands),
    }));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    while context.running {
        if let Some(helper) = editor.helper_mut() {
            let backups = context.manager.list_backups().unwrap_or_default();
            helper.index.refresh(context.manager.ledger(), backups);
        }

        let line = match editor.readline(&context.prompt()) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
                continue;
            }
            Err(ReadlineError::Eof) => {
                cli_io::print_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        editor.add_history_entry(line).ok();
        if execute(context, line)? == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Runs one command per input line. Blank lines and `#` comments are skipped.
fn run_script(context: &mut ShellContext, input: impl BufRead) -> Result<(), CliError> {
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if execute(context, line)? == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Tokenizes and dispatches `line`; command failures are reported here so the loop keeps going.
fn execute(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            cli_io::print_warning(format!("Cannot read `{line}`: {err}"));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((command, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    match context.dispatch(command, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        Ok(LoopControl::Continue) => Ok(LoopControl::Continue),
        Err(err) => {
            context.report_error(err)?;
            Ok(LoopControl::Continue)
        }
    }
}

/// Line-editor glue; all candidates come from the [`CompletionIndex`].
struct LedgerHelper {
    index: CompletionIndex,
}

impl Helper for LedgerHelper {}

impl Completer for LedgerHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, words) = self.index.complete(&line[..pos]);
        let pairs = words
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for LedgerHelper {
    type Hint = String;
}

impl Highlighter for LedgerHelper {}

impl Validator for LedgerHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::CommandSet;
    use crate::ledger::{Envelope, Ledger};

    #[test]
    fn helper_offers_ledger_categories_at_the_cursor() {
        let mut ledger = Ledger::new();
        ledger.add_envelope(Envelope::new("Food", 300.0)).unwrap();
        let mut helper = LedgerHelper {
            index: CompletionIndex::new(&CommandSet::load()),
        };
        helper.index.refresh(&ledger, Vec::new());

        let history = DefaultHistory::new();
        let ctx = ReadlineContext::new(&history);
        let line = "expense list F and more";
        let (start, pairs) = helper.complete(line, 14, &ctx).unwrap();
        assert_eq!(start, 13);
        let words: Vec<_> = pairs.into_iter().map(|pair| pair.replacement).collect();
        assert_eq!(words, vec!["Food"]);
    }
}
