use crate::cli::commands::{CommandEntry, CommandSet};
use crate::cli::output;

pub fn print_overview(commands: &CommandSet) {
    output::section("Available commands");
    let width = commands.iter().map(|entry| entry.name.len()).max().unwrap_or(0);
    for entry in commands.iter() {
        println!("  {:<width$}  {}", entry.name, entry.description, width = width);
    }
    output::info("Use `help <command>` for details. Tab completes commands, ids and categories.");
}

pub fn print_command(entry: &CommandEntry) {
    output::section(format!("Help: {}", entry.name));
    println!("  description: {}", entry.description);
    let mut forms = entry.usage.split(" | ");
    if let Some(first) = forms.next() {
        println!("  usage:       {first}");
    }
    for form in forms {
        println!("               {} {form}", entry.name);
    }
}
