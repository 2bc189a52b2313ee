use std::fs;
use std::path::Path;

use crate::cli::commands::{parse_import_mode, rest};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io as cli_io;
use crate::cli::output;
use crate::cli::commands::CommandEntry;
use crate::interchange::ImportMode;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "export",
            "Write the full ledger to a JSON file",
            "export <path>",
            cmd_export,
        ),
        CommandEntry::new(
            "import",
            "Load a JSON ledger, merging by id or overwriting",
            "import <path> [merge|overwrite]",
            cmd_import,
        ),
        CommandEntry::new(
            "import-csv",
            "Load expenses from a bank statement CSV",
            "import-csv <path> [merge|overwrite]",
            cmd_import_csv,
        ),
        CommandEntry::new(
            "backup",
            "Create, list or restore ledger backups",
            "backup [create [<note...>]] | list | restore <backup>",
            cmd_backup,
        ),
    ]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [path] = args else {
        return Err(CommandError::usage("export <path>"));
    };
    let path = Path::new(path);
    context.manager.export_to_path(path)?;
    cli_io::print_success(format!(
        "Exported {} records to {}.",
        context.manager.ledger().record_count(),
        path.display()
    ));
    Ok(())
}

fn confirm_overwrite(
    context: &ShellContext,
    mode: ImportMode,
    what: &str,
) -> Result<bool, CommandError> {
    if mode != ImportMode::Overwrite {
        return Ok(true);
    }
    context.confirm(&format!("Overwrite the current {what}?"))
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args.len() > 2 {
        return Err(CommandError::usage("import <path> [merge|overwrite]"));
    }
    let mode = parse_import_mode(args.get(1))?;
    let text = fs::read_to_string(args[0])?;
    if !confirm_overwrite(context, mode, "ledger")? {
        cli_io::print_info("Import cancelled.");
        return Ok(());
    }

    let strategy = context.manager.config().merge;
    let mut resolver = ShellContext::resolver(&context.theme, context.mode, strategy);
    let report = context
        .manager
        .import_json(&text, mode, resolver.as_mut())?;
    drop(resolver);

    for migration in &report.migrations {
        cli_io::print_info(format!("Migrated: {migration}"));
    }
    for warning in &report.warnings {
        cli_io::print_warning(warning);
    }
    match mode {
        ImportMode::Overwrite => cli_io::print_success(format!(
            "Ledger replaced with {} records.",
            context.manager.ledger().record_count()
        )),
        ImportMode::Merge => {
            cli_io::print_success(format!(
                "Merged: {} added, {} replaced, {} kept, {} unchanged.",
                report.added, report.replaced, report.kept, report.unchanged
            ));
            if report.base_income_replaced {
                cli_io::print_info("Base income taken from the imported file.");
            }
        }
    }
    Ok(())
}

fn cmd_import_csv(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args.len() > 2 {
        return Err(CommandError::usage("import-csv <path> [merge|overwrite]"));
    }
    let mode = parse_import_mode(args.get(1))?;
    let text = fs::read_to_string(args[0])?;
    if !confirm_overwrite(context, mode, "variable expenses")? {
        cli_io::print_info("Import cancelled.");
        return Ok(());
    }

    let report = context.manager.import_csv(&text, mode)?;
    cli_io::print_success(format!(
        "Imported {} expense(s) and {} income(s).",
        report.expenses, report.incomes
    ));
    if !report.skipped.is_empty() {
        cli_io::print_warning(format!("{} row(s) skipped:", report.skipped.len()));
        for row in &report.skipped {
            println!("  line {}: {}", row.line, row.reason);
        }
    }
    Ok(())
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = args
        .first()
        .map(|value| value.to_lowercase())
        .unwrap_or_else(|| "create".into());
    match action.as_str() {
        "create" => {
            let note = rest(args.get(1..).unwrap_or_default());
            let note = (!note.trim().is_empty()).then_some(note.as_str());
            let path = context.manager.backup(note)?;
            cli_io::print_success(format!("Backup written to {}.", path.display()));
            Ok(())
        }
        "list" => {
            let backups = context.manager.list_backups()?;
            output::section("Backups");
            if backups.is_empty() {
                cli_io::print_info("No backups yet.");
            }
            for name in backups {
                println!("  {name}");
            }
            Ok(())
        }
        "restore" => {
            let Some(name) = args.get(1) else {
                return Err(CommandError::usage("backup restore <backup>"));
            };
            if !context.confirm(&format!("Replace the current ledger with {name}?"))? {
                cli_io::print_info("Restore cancelled.");
                return Ok(());
            }
            let metadata = context.manager.restore_backup(name)?;
            context.report_load(&metadata);
            cli_io::print_success(format!("Restored {name}."));
            Ok(())
        }
        _ => Err(CommandError::usage(
            "backup [create [<note...>]] | list | restore <backup>",
        )),
    }
}
