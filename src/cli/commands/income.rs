use crate::cli::commands::{parse_amount, resolve_id, rest};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::formatters::short_id;
use crate::cli::io as cli_io;
use crate::cli::output;
use crate::cli::commands::CommandEntry;
use crate::core::services::SummaryService;
use crate::ledger::{BaseIncome, MonthKey, OneOffIncome, Record};

const INCOME_USAGE: &str = "income <add|list|edit|remove> ...";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "base",
            "Show or set the three recurring base incomes",
            "base [<primary> <secondary> <other>]",
            cmd_base,
        ),
        CommandEntry::new(
            "income",
            "Manage one-off incomes",
            "income add <YYYY-MM-DD> <amount> [<description...>] | list | edit <id> <date|description|amount> <value...> | remove <id>",
            cmd_income,
        ),
    ]
}

fn cmd_base(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {}
        [primary, secondary, other] => {
            let income = BaseIncome::new(
                parse_amount(primary)?,
                parse_amount(secondary)?,
                parse_amount(other)?,
            );
            if [income.primary, income.secondary, income.other]
                .iter()
                .any(|amount| *amount < 0.0)
            {
                return Err(CommandError::InvalidArguments(
                    "base incomes cannot be negative".into(),
                ));
            }
            context.manager.apply("base income", |ledger| {
                ledger.set_base_income(income);
                Ok(())
            })?;
            cli_io::print_success("Base income updated.");
        }
        _ => return Err(CommandError::usage("base [<primary> <secondary> <other>]")),
    }

    let amounts = context.amounts();
    let base = &context.manager.ledger().base_income;
    output::section("Base income");
    for (label, amount) in [
        ("Primary", base.primary),
        ("Secondary", base.secondary),
        ("Other", base.other),
        ("Total", base.total()),
    ] {
        println!("  {:<12}{:>16}", label, amounts.format(amount));
    }
    Ok(())
}

fn cmd_income(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return list(context);
    };
    match action.to_lowercase().as_str() {
        "add" => add(context, &args[1..]),
        "list" => list(context),
        "edit" => edit(context, &args[1..]),
        "remove" | "rm" => remove(context, &args[1..]),
        _ => Err(CommandError::usage(INCOME_USAGE)),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(CommandError::usage(
            "income add <YYYY-MM-DD> <amount> [description...]",
        ));
    }
    let amount = parse_amount(args[1])?;
    let income = OneOffIncome::new(args[0], rest(&args[2..]), amount);
    let id = context
        .manager
        .apply("add income", |ledger| ledger.add_one_off_income(income))?;
    cli_io::print_success(format!("Income {} recorded.", short_id(&id)));
    warn_outside_active_month(context, args[0]);
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let month = context.manager.active_month();
    let amounts = context.amounts();
    let incomes = SummaryService::one_off_incomes(context.manager.ledger(), month);
    output::section(format!("One-off incomes {month}"));
    if incomes.is_empty() {
        cli_io::print_info("No one-off incomes this month.");
        return Ok(());
    }
    for income in incomes {
        println!(
            "  {}  {}  {:<24}{:>16}",
            short_id(&income.id),
            income.date,
            income.description,
            amounts.format(income.amount)
        );
    }
    Ok(())
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "income edit <id> <date|description|amount> <value...>";
    if args.len() < 3 {
        return Err(CommandError::usage(usage));
    }
    let id = find(context, args[0])?;
    let value = rest(&args[2..]);
    let change: Box<dyn FnOnce(&mut OneOffIncome)> = match args[1].to_lowercase().as_str() {
        "date" => Box::new(move |income| income.date = value),
        "description" => Box::new(move |income| income.description = value),
        "amount" => {
            let amount = parse_amount(&value)?;
            Box::new(move |income| income.amount = amount)
        }
        _ => return Err(CommandError::usage(usage)),
    };
    context
        .manager
        .apply("edit income", |ledger| ledger.update_one_off_income(&id, change))?;
    cli_io::print_success(format!("Income {} updated.", short_id(&id)));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [needle] = args else {
        return Err(CommandError::usage("income remove <id>"));
    };
    let id = find(context, needle)?;
    if !context.confirm(&format!("Remove income {}?", short_id(&id)))? {
        cli_io::print_info("Nothing removed.");
        return Ok(());
    }
    let removed = context
        .manager
        .apply("remove income", |ledger| ledger.remove_one_off_income(&id))?;
    cli_io::print_success(format!("Removed income `{}`.", removed.description));
    Ok(())
}

fn find(context: &ShellContext, needle: &str) -> Result<String, CommandError> {
    let ledger = context.manager.ledger();
    resolve_id(
        OneOffIncome::KIND,
        ledger.one_off_incomes.iter().map(|income| income.id.as_str()),
        needle,
    )
}

pub(super) fn warn_outside_active_month(context: &ShellContext, date: &str) {
    let active = context.manager.active_month();
    if MonthKey::from_date_str(date) != Some(active) {
        cli_io::print_info(format!(
            "Recorded outside the active month {active}; it will not show in this month's summary."
        ));
    }
}
