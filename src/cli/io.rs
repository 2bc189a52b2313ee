use std::fmt;

use dialoguer::{theme::ColorfulTheme, Confirm, Select};

use crate::cli::core::CommandError;
use crate::cli::output;
use crate::interchange::{Collision, CollisionResolver, Resolution};

pub fn print_info(message: impl fmt::Display) {
    output::info(message);
}

pub fn print_warning(message: impl fmt::Display) {
    output::warning(message);
}

pub fn print_error(message: impl fmt::Display) {
    output::error(message);
}

pub fn print_success(message: impl fmt::Display) {
    output::success(message);
}

/// Prompt the user for confirmation with a yes/no question.
pub fn confirm_action(
    theme: &ColorfulTheme,
    prompt: &str,
    default: bool,
) -> Result<bool, CommandError> {
    Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(CommandError::from)
}

/// Asks about each merge collision, with options to settle all remaining ones at once.
pub struct PromptResolver<'a> {
    theme: &'a ColorfulTheme,
    remembered: Option<Resolution>,
}

impl<'a> PromptResolver<'a> {
    pub fn new(theme: &'a ColorfulTheme) -> Self {
        Self {
            theme,
            remembered: None,
        }
    }
}

impl CollisionResolver for PromptResolver<'_> {
    fn resolve(&mut self, collision: &Collision) -> Resolution {
        if let Some(answer) = self.remembered {
            return answer;
        }
        print_warning(format!(
            "{} `{}` already exists.\n    current:  {}\n    imported: {}",
            collision.kind, collision.id, collision.existing, collision.incoming
        ));
        let options = [
            "Keep current",
            "Replace with imported",
            "Keep current for all remaining",
            "Replace all remaining",
        ];
        let choice = Select::with_theme(self.theme)
            .with_prompt("Resolve collision")
            .items(&options)
            .default(0)
            .interact();
        match choice {
            Ok(1) => Resolution::Replace,
            Ok(2) => {
                self.remembered = Some(Resolution::Keep);
                Resolution::Keep
            }
            Ok(3) => {
                self.remembered = Some(Resolution::Replace);
                Resolution::Replace
            }
            // A cancelled prompt never discards existing data.
            _ => Resolution::Keep,
        }
    }
}
