use crate::cli::commands::{parse_amount, resolve_id, rest};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::formatters::{render_envelopes, short_id};
use crate::cli::io as cli_io;
use crate::cli::output;
use crate::cli::commands::CommandEntry;
use crate::ledger::{Envelope, Record};

const ENVELOPE_USAGE: &str = "envelope <add|list|edit|remove> ...";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "envelope",
        "Manage monthly spending envelopes",
        "envelope add <name> [<budget>] | list | edit <id> <name|budget> <value...> | remove <id>",
        cmd_envelope,
    )]
}

fn cmd_envelope(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return list(context);
    };
    match action.to_lowercase().as_str() {
        "add" => add(context, &args[1..]),
        "list" => list(context),
        "edit" => edit(context, &args[1..]),
        "remove" | "rm" => remove(context, &args[1..]),
        _ => Err(CommandError::usage(ENVELOPE_USAGE)),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let envelope = match args {
        [name] => Envelope::new(*name, 0.0),
        [name, budget] => Envelope::new(*name, parse_amount(budget)?),
        _ => return Err(CommandError::usage("envelope add <name> [budget]")),
    };
    let id = context
        .manager
        .apply("add envelope", |ledger| ledger.add_envelope(envelope))?;
    cli_io::print_success(format!("Envelope {} added.", short_id(&id)));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let month = context.manager.active_month();
    let reports = context.manager.envelope_reports();
    output::section(format!("Envelopes {month}"));
    if reports.is_empty() {
        cli_io::print_info("No envelopes defined.");
        return Ok(());
    }
    print!("{}", render_envelopes(&reports, &context.amounts()));
    Ok(())
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "envelope edit <id> <name|budget> <value...>";
    if args.len() < 3 {
        return Err(CommandError::usage(usage));
    }
    let id = find(context, args[0])?;
    let value = rest(&args[2..]);
    let change: Box<dyn FnOnce(&mut Envelope)> = match args[1].to_lowercase().as_str() {
        "name" => Box::new(move |envelope| envelope.name = value),
        "budget" => {
            let budget = parse_amount(&value)?;
            Box::new(move |envelope| envelope.budget = budget)
        }
        _ => return Err(CommandError::usage(usage)),
    };
    context
        .manager
        .apply("edit envelope", |ledger| ledger.update_envelope(&id, change))?;
    cli_io::print_success(format!("Envelope {} updated.", short_id(&id)));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [needle] = args else {
        return Err(CommandError::usage("envelope remove <id>"));
    };
    let id = find(context, needle)?;
    if !context.confirm(&format!("Remove envelope {}?", short_id(&id)))? {
        cli_io::print_info("Nothing removed.");
        return Ok(());
    }
    let removed = context
        .manager
        .apply("remove envelope", |ledger| ledger.remove_envelope(&id))?;
    cli_io::print_success(format!(
        "Removed envelope `{}`; its expenses are kept.",
        removed.name
    ));
    Ok(())
}

fn find(context: &ShellContext, needle: &str) -> Result<String, CommandError> {
    resolve_id(
        Envelope::KIND,
        context
            .manager
            .ledger()
            .envelopes
            .iter()
            .map(|envelope| envelope.id.as_str()),
        needle,
    )
}
