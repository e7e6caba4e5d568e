use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandRegistry};

const NAME_COLUMN: usize = 12;

pub fn print_overview(registry: &CommandRegistry) {
    output::section("Commands");
    for entry in registry.list() {
        io::print_info(format!(
            "  {:<width$} {}",
            entry.name,
            entry.description,
            width = NAME_COLUMN
        ));
    }
    io::print_info("Run `help <command>` to see its usage.");
}

pub fn print_command(entry: &CommandEntry) {
    output::section(entry.name);
    io::print_info(entry.description);
    io::print_info(format!("  usage: {}", entry.usage));
}
