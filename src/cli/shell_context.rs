use dialoguer::theme::ColorfulTheme;
use crate::{
    cli::{
        commands::{CommandEntry, CommandSet},
        core::{CliError, CliMode, CommandError, CommandResult, LoopControl},
        formatters::AmountFormatter,
        io as cli_io,
        output,
    },
    config::{Config, ConfigManager, MergeStrategy},
    core::{LedgerManager, LoadMetadata},
    interchange::{BlanketResolver, CollisionResolver},
    storage::JsonStorage,
    utils::paths,
};

use super::io::PromptResolver;

pub struct ShellContext {
    pub mode: CliMode,
    pub commands: CommandSet,
    pub manager: LedgerManager,
    pub config_manager: ConfigManager,
    pub theme: ColorfulTheme,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base = paths::app_data_dir();
        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let config = config_manager.load()?;
        let storage = JsonStorage::new(Some(base), None)?;
        let (manager, metadata) = LedgerManager::open(Box::new(storage), config)?;

        output::set_preferences(output::OutputPreferences {
            plain: mode == CliMode::Script,
            quiet: false,
        });

        let context = Self {
            mode,
            commands: CommandSet::load(),
            manager,
            config_manager,
            theme: ColorfulTheme::default(),
            running: true,
        };
        context.report_load(&metadata);
        Ok(context)
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub fn config(&self) -> &Config {
        self.manager.config()
    }

    pub fn amounts(&self) -> AmountFormatter {
        AmountFormatter::from_config(self.manager.config())
    }

    pub fn prompt(&self) -> String {
        format!("ledger [{}]> ", self.manager.active_month())
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.find(name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.commands.find(command).map(|entry| entry.handler) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(command);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(name) = self.commands.closest(input) {
            cli_io::print_info(format!("Did you mean `{}`?", name));
        }
    }

    /// Yes/no question; script mode always answers yes.
    pub fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action(&self.theme, "Exit shell?", true).unwrap_or(true))
    }

    /// Collision resolver for merge imports: a prompt when interactive and the configured
    /// strategy asks, a fixed answer otherwise.
    pub fn resolver(
        theme: &ColorfulTheme,
        mode: CliMode,
        strategy: MergeStrategy,
    ) -> Box<dyn CollisionResolver + '_> {
        match (mode, strategy) {
            (CliMode::Interactive, MergeStrategy::Ask) => Box::new(PromptResolver::new(theme)),
            _ => Box::new(BlanketResolver(strategy.blanket())),
        }
    }

    pub fn save_config(&mut self, config: Config) -> CommandResult {
        self.config_manager.save(&config)?;
        self.manager.set_config(config);
        Ok(())
    }

    pub(crate) fn report_load(&self, metadata: &LoadMetadata) {
        for migration in &metadata.migrations {
            cli_io::print_info(format!("Migrated: {migration}"));
        }
        for warning in &metadata.warnings {
            cli_io::print_warning(warning);
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                cli_io::print_error(other.to_string());
                Ok(())
            }
        }
    }
}
