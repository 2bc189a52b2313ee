use crate::cli::commands::{parse_amount, parse_month, resolve_id, rest};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::formatters::short_id;
use crate::cli::io as cli_io;
use crate::cli::output;
use crate::cli::commands::CommandEntry;
use crate::core::services::SummaryService;
use crate::ledger::{FixedCategory, FixedExpense, Record};

const FIXED_USAGE: &str = "fixed <add|list|all|end|edit|remove> ...";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "fixed",
        "Manage recurring fixed expenses",
        "fixed add <name> <amount> [<category>] [end <YYYY-MM>] | list | all | end <id> <YYYY-MM|none> | edit <id> <name|amount|category> <value...> | remove <id>",
        cmd_fixed,
    )]
}

fn cmd_fixed(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return list(context, false);
    };
    match action.to_lowercase().as_str() {
        "add" => add(context, &args[1..]),
        "list" => list(context, false),
        "all" => list(context, true),
        "end" => end(context, &args[1..]),
        "edit" => edit(context, &args[1..]),
        "remove" | "rm" => remove(context, &args[1..]),
        _ => Err(CommandError::usage(FIXED_USAGE)),
    }
}

fn parse_category(raw: &str) -> Result<FixedCategory, CommandError> {
    raw.parse::<FixedCategory>().map_err(|_| {
        let known: Vec<String> = FixedCategory::ALL.iter().map(|c| c.to_string()).collect();
        CommandError::InvalidArguments(format!(
            "unknown category `{raw}` (expected one of: {})",
            known.join(", ")
        ))
    })
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "fixed add <name> <amount> [category] [end YYYY-MM]";
    if args.len() < 2 || args.len() > 4 {
        return Err(CommandError::usage(usage));
    }
    let amount = parse_amount(args[1])?;
    let category = match args.get(2) {
        Some(raw) => parse_category(raw)?,
        None => FixedCategory::default(),
    };
    let mut expense = FixedExpense::new(args[0], category, amount);
    if let Some(raw) = args.get(3) {
        expense = expense.ending(parse_month(raw)?);
    }
    let id = context
        .manager
        .apply("add fixed", |ledger| ledger.add_fixed_expense(expense))?;
    cli_io::print_success(format!("Fixed expense {} added.", short_id(&id)));
    Ok(())
}

fn list(context: &mut ShellContext, include_ended: bool) -> CommandResult {
    let month = context.manager.active_month();
    let amounts = context.amounts();
    let ledger = context.manager.ledger();
    let expenses: Vec<&FixedExpense> = if include_ended {
        ledger.fixed_expenses.iter().collect()
    } else {
        SummaryService::active_fixed_expenses(ledger, month)
    };
    if include_ended {
        output::section("Fixed expenses");
    } else {
        output::section(format!("Fixed expenses active in {month}"));
    }
    if expenses.is_empty() {
        cli_io::print_info("No fixed expenses.");
        return Ok(());
    }
    for expense in expenses {
        let end = match &expense.end_month {
            Some(end) => format!("until {end}"),
            None => String::new(),
        };
        println!(
            "  {}  {:<20} {:<14}{:>16}  {}",
            short_id(&expense.id),
            expense.name,
            expense.category.to_string(),
            amounts.format(expense.amount),
            end
        );
    }
    Ok(())
}

fn end(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [needle, raw] = args else {
        return Err(CommandError::usage("fixed end <id> <YYYY-MM|none>"));
    };
    let id = find(context, needle)?;
    let end = if raw.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(parse_month(raw)?)
    };
    context
        .manager
        .apply("end fixed", |ledger| ledger.set_fixed_expense_end(&id, end))?;
    match end {
        Some(month) => cli_io::print_success(format!(
            "Fixed expense {} ends after {month}.",
            short_id(&id)
        )),
        None => cli_io::print_success(format!(
            "Fixed expense {} no longer ends.",
            short_id(&id)
        )),
    }
    Ok(())
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "fixed edit <id> <name|amount|category> <value...>";
    if args.len() < 3 {
        return Err(CommandError::usage(usage));
    }
    let id = find(context, args[0])?;
    let value = rest(&args[2..]);
    let change: Box<dyn FnOnce(&mut FixedExpense)> = match args[1].to_lowercase().as_str() {
        "name" => Box::new(move |expense| expense.name = value),
        "amount" => {
            let amount = parse_amount(&value)?;
            Box::new(move |expense| expense.amount = amount)
        }
        "category" => {
            let category = parse_category(&value)?;
            Box::new(move |expense| expense.category = category)
        }
        _ => return Err(CommandError::usage(usage)),
    };
    context
        .manager
        .apply("edit fixed", |ledger| ledger.update_fixed_expense(&id, change))?;
    cli_io::print_success(format!("Fixed expense {} updated.", short_id(&id)));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [needle] = args else {
        return Err(CommandError::usage("fixed remove <id>"));
    };
    let id = find(context, needle)?;
    if !context.confirm(&format!("Remove fixed expense {}?", short_id(&id)))? {
        cli_io::print_info("Nothing removed.");
        return Ok(());
    }
    let removed = context
        .manager
        .apply("remove fixed", |ledger| ledger.remove_fixed_expense(&id))?;
    cli_io::print_success(format!("Removed fixed expense `{}`.", removed.name));
    Ok(())
}

fn find(context: &ShellContext, needle: &str) -> Result<String, CommandError> {
    resolve_id(
        FixedExpense::KIND,
        context
            .manager
            .ledger()
            .fixed_expenses
            .iter()
            .map(|expense| expense.id.as_str()),
        needle,
    )
}
