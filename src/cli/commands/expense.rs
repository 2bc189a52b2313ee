use crate::cli::commands::{income::warn_outside_active_month, parse_amount, resolve_id, rest};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::formatters::short_id;
use crate::cli::io as cli_io;
use crate::cli::output;
use crate::cli::commands::CommandEntry;
use crate::core::services::SummaryService;
use crate::ledger::{Record, VariableExpense};

const EXPENSE_USAGE: &str = "expense <add|list|edit|remove> ...";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "expense",
        "Manage dated variable expenses",
        "expense add <YYYY-MM-DD> <category> <amount> [<description...>] | list [<category>] | edit <id> <date|category|description|amount> <value...> | remove <id>",
        cmd_expense,
    )]
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return list(context, None);
    };
    match action.to_lowercase().as_str() {
        "add" => add(context, &args[1..]),
        "list" => list(context, args.get(1).copied()),
        "edit" => edit(context, &args[1..]),
        "remove" | "rm" => remove(context, &args[1..]),
        _ => Err(CommandError::usage(EXPENSE_USAGE)),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 3 {
        return Err(CommandError::usage(
            "expense add <YYYY-MM-DD> <category> <amount> [description...]",
        ));
    }
    let amount = parse_amount(args[2])?;
    let expense = VariableExpense::new(args[0], args[1], rest(&args[3..]), amount);
    let id = context
        .manager
        .apply("add expense", |ledger| ledger.add_variable_expense(expense))?;
    cli_io::print_success(format!("Expense {} recorded.", short_id(&id)));
    warn_outside_active_month(context, args[0]);
    Ok(())
}

fn list(context: &mut ShellContext, category: Option<&str>) -> CommandResult {
    let month = context.manager.active_month();
    let amounts = context.amounts();
    let expenses: Vec<&VariableExpense> =
        SummaryService::variable_expenses(context.manager.ledger(), month)
            .into_iter()
            .filter(|expense| category.map_or(true, |name| expense.matches_category(name)))
            .collect();
    output::section(format!("Variable expenses {month}"));
    if expenses.is_empty() {
        cli_io::print_info("No expenses recorded.");
        return Ok(());
    }
    let mut total = 0.0;
    for expense in expenses {
        total += expense.amount;
        println!(
            "  {}  {}  {:<14} {:<24}{:>16}",
            short_id(&expense.id),
            expense.date,
            expense.category,
            expense.description,
            amounts.format(expense.amount)
        );
    }
    println!("  {:<62}{:>16}", "Total", amounts.format(total));
    Ok(())
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "expense edit <id> <date|category|description|amount> <value...>";
    if args.len() < 3 {
        return Err(CommandError::usage(usage));
    }
    let id = find(context, args[0])?;
    let value = rest(&args[2..]);
    let change: Box<dyn FnOnce(&mut VariableExpense)> = match args[1].to_lowercase().as_str() {
        "date" => Box::new(move |expense| expense.date = value),
        "category" => Box::new(move |expense| expense.category = value),
        "description" => Box::new(move |expense| expense.description = value),
        "amount" => {
            let amount = parse_amount(&value)?;
            Box::new(move |expense| expense.amount = amount)
        }
        _ => return Err(CommandError::usage(usage)),
    };
    context
        .manager
        .apply("edit expense", |ledger| ledger.update_variable_expense(&id, change))?;
    cli_io::print_success(format!("Expense {} updated.", short_id(&id)));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [needle] = args else {
        return Err(CommandError::usage("expense remove <id>"));
    };
    let id = find(context, needle)?;
    if !context.confirm(&format!("Remove expense {}?", short_id(&id)))? {
        cli_io::print_info("Nothing removed.");
        return Ok(());
    }
    let removed = context
        .manager
        .apply("remove expense", |ledger| ledger.remove_variable_expense(&id))?;
    cli_io::print_success(format!(
        "Removed {} expense from {}.",
        removed.category, removed.date
    ));
    Ok(())
}

fn find(context: &ShellContext, needle: &str) -> Result<String, CommandError> {
    resolve_id(
        VariableExpense::KIND,
        context
            .manager
            .ledger()
            .variable_expenses
            .iter()
            .map(|expense| expense.id.as_str()),
        needle,
    )
}
