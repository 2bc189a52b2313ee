use crate::cli::commands::{parse_amount, resolve_id, rest, today};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::formatters::{render_goals, short_id};
use crate::cli::io as cli_io;
use crate::cli::output;
use crate::cli::commands::CommandEntry;
use crate::ledger::{Record, SavingsGoal};

const GOAL_USAGE: &str = "goal <add|list|deposit|withdraw|edit|remove> ...";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "goal",
        "Manage savings goals",
        "goal add <name> [<target>] [<balance>] | list | deposit <id> <amount> [<YYYY-MM-DD>] | withdraw <id> <amount> | edit <id> <name|target> <value...> | remove <id>",
        cmd_goal,
    )]
}

fn cmd_goal(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(action) = args.first() else {
        return list(context);
    };
    match action.to_lowercase().as_str() {
        "add" => add(context, &args[1..]),
        "list" => list(context),
        "deposit" => deposit(context, &args[1..]),
        "withdraw" => withdraw(context, &args[1..]),
        "edit" => edit(context, &args[1..]),
        "remove" | "rm" => remove(context, &args[1..]),
        _ => Err(CommandError::usage(GOAL_USAGE)),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let goal = match args {
        [name] => SavingsGoal::new(*name, 0.0, 0.0),
        [name, target] => SavingsGoal::new(*name, parse_amount(target)?, 0.0),
        [name, target, balance] => {
            SavingsGoal::new(*name, parse_amount(target)?, parse_amount(balance)?)
        }
        _ => return Err(CommandError::usage("goal add <name> [target] [balance]")),
    };
    let id = context
        .manager
        .apply("add goal", |ledger| ledger.add_savings_goal(goal))?;
    cli_io::print_success(format!("Savings goal {} added.", short_id(&id)));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let goals = context.manager.goal_progress();
    output::section("Savings goals");
    if goals.is_empty() {
        cli_io::print_info("No savings goals.");
        return Ok(());
    }
    print!("{}", render_goals(&goals, &context.amounts()));
    Ok(())
}

fn deposit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (needle, raw, date) = match args {
        [needle, raw] => (*needle, *raw, today()),
        [needle, raw, date] => (*needle, *raw, date.to_string()),
        _ => {
            return Err(CommandError::usage(
                "goal deposit <id> <amount> [YYYY-MM-DD]",
            ))
        }
    };
    let id = find(context, needle)?;
    let amount = parse_amount(raw)?;
    let outcome = context.manager.deposit(&id, amount, &date)?;
    let amounts = context.amounts();
    cli_io::print_success(format!(
        "Deposited {}; balance is now {}.",
        amounts.format(amount),
        amounts.format(outcome.balance)
    ));
    if let Some(expense_id) = outcome.expense_id {
        cli_io::print_info(format!(
            "Recorded as expense {} on {date}.",
            short_id(&expense_id)
        ));
    }
    Ok(())
}

fn withdraw(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [needle, raw] = args else {
        return Err(CommandError::usage("goal withdraw <id> <amount>"));
    };
    let id = find(context, needle)?;
    let amount = parse_amount(raw)?;
    let balance = context.manager.withdraw(&id, amount)?;
    let amounts = context.amounts();
    cli_io::print_success(format!(
        "Withdrew {}; balance is now {}.",
        amounts.format(amount),
        amounts.format(balance)
    ));
    if balance < 0.0 {
        cli_io::print_warning("The goal balance is negative.");
    }
    Ok(())
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "goal edit <id> <name|target> <value...>";
    if args.len() < 3 {
        return Err(CommandError::usage(usage));
    }
    let id = find(context, args[0])?;
    let value = rest(&args[2..]);
    let change: Box<dyn FnOnce(&mut SavingsGoal)> = match args[1].to_lowercase().as_str() {
        "name" => Box::new(move |goal| goal.name = value),
        "target" => {
            let target = parse_amount(&value)?;
            Box::new(move |goal| goal.target = target)
        }
        _ => return Err(CommandError::usage(usage)),
    };
    context
        .manager
        .apply("edit goal", |ledger| ledger.update_savings_goal(&id, change))?;
    cli_io::print_success(format!("Savings goal {} updated.", short_id(&id)));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [needle] = args else {
        return Err(CommandError::usage("goal remove <id>"));
    };
    let id = find(context, needle)?;
    if !context.confirm(&format!("Remove savings goal {}?", short_id(&id)))? {
        cli_io::print_info("Nothing removed.");
        return Ok(());
    }
    let removed = context
        .manager
        .apply("remove goal", |ledger| ledger.remove_savings_goal(&id))?;
    cli_io::print_success(format!("Removed savings goal `{}`.", removed.name));
    Ok(())
}

fn find(context: &ShellContext, needle: &str) -> Result<String, CommandError> {
    resolve_id(
        SavingsGoal::KIND,
        context
            .manager
            .ledger()
            .savings_goals
            .iter()
            .map(|goal| goal.id.as_str()),
        needle,
    )
}
