use crate::cli::commands::rest;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io as cli_io;
use crate::cli::output;
use crate::cli::commands::CommandEntry;
use crate::config::CONFIG_KEYS;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "Show or change settings",
        "config [show] | set <key> <value...>",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|value| value.to_lowercase()).as_deref() {
        None | Some("show") => {
            output::section("Configuration");
            for (key, value) in context.config().entries() {
                println!("  {:<26}{}", key, value);
            }
            println!("  {:<26}{}", "file", context.config_manager.path().display());
            Ok(())
        }
        Some("set") => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <key> <value...> (keys: {})",
                    CONFIG_KEYS.join(", ")
                )));
            }
            let key = args[1].to_lowercase();
            let mut config = context.config().clone();
            config.set(&key, &rest(&args[2..]))?;
            context.save_config(config)?;
            cli_io::print_success(format!("{key} updated."));
            Ok(())
        }
        _ => Err(CommandError::usage("config [show] | set <key> <value...>")),
    }
}
