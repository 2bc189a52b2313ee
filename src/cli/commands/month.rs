use crate::cli::commands::{parse_month, rest};
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::formatters::{render_envelopes, render_goals, render_summary};
use crate::cli::io as cli_io;
use crate::cli::output;
use crate::cli::commands::CommandEntry;
use crate::core::services::CategoryService;
use crate::ledger::MonthKey;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "month",
            "Show or change the active month",
            "month [YYYY-MM|next|prev|today]",
            cmd_month,
        ),
        CommandEntry::new(
            "summary",
            "Totals, envelopes and savings for the active month",
            "summary",
            cmd_summary,
        ),
        CommandEntry::new(
            "note",
            "Show, set or clear the note of the active month",
            "note [<text...>|clear]",
            cmd_note,
        ),
        CommandEntry::new(
            "categories",
            "List category suggestions",
            "categories [<prefix>]",
            cmd_categories,
        ),
    ]
}

fn cmd_month(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|value| value.to_lowercase()).as_deref() {
        None => {}
        Some("next") => {
            context.manager.shift_month(1);
        }
        Some("prev") | Some("previous") => {
            context.manager.shift_month(-1);
        }
        Some("today") | Some("current") => context.manager.set_active_month(MonthKey::current()),
        Some(_) => {
            let month = parse_month(args[0])?;
            context.manager.set_active_month(month);
        }
    }
    let month = context.manager.active_month();
    cli_io::print_info(format!("Active month: {} ({})", month.label(), month));
    Ok(())
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let amounts = context.amounts();
    let summary = context.manager.summary();
    output::section("Summary");
    print!("{}", render_summary(&summary, &amounts));

    let envelopes = context.manager.envelope_reports();
    if !envelopes.is_empty() {
        output::section("Envelopes");
        print!("{}", render_envelopes(&envelopes, &amounts));
    }
    let goals = context.manager.goal_progress();
    if !goals.is_empty() {
        output::section("Savings goals");
        print!("{}", render_goals(&goals, &amounts));
    }
    if let Some(note) = context.manager.note() {
        output::section("Note");
        println!("  {note}");
    }
    Ok(())
}

fn cmd_note(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let month = context.manager.active_month();
    if args.is_empty() {
        match context.manager.note() {
            Some(note) => println!("{note}"),
            None => cli_io::print_info(format!("No note for {month}.")),
        }
        return Ok(());
    }
    let text = if args.len() == 1 && args[0].eq_ignore_ascii_case("clear") {
        String::new()
    } else {
        rest(args)
    };
    let cleared = text.trim().is_empty();
    context.manager.apply("note", |ledger| {
        ledger.set_note(month, text);
        Ok(())
    })?;
    if cleared {
        cli_io::print_success(format!("Note for {month} cleared."));
    } else {
        cli_io::print_success(format!("Note for {month} saved."));
    }
    Ok(())
}

fn cmd_categories(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let ledger = context.manager.ledger();
    let values = match args.first() {
        Some(prefix) => CategoryService::matching(ledger, prefix),
        None => CategoryService::suggestions(ledger),
    };
    if values.is_empty() {
        cli_io::print_info("No categories yet.");
    }
    for value in values {
        println!("  {value}");
    }
    Ok(())
}
