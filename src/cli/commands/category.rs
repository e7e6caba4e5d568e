use crate::cli::args::ParsedArgs;
use crate::cli::context::{CliMode, ShellContext};
use crate::cli::error::{CommandError, CommandResult};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("categories", "List categories", "categories", cmd_categories),
        CommandEntry::new(
            "category",
            "Create or delete a category",
            "category add <name> | category rm <name> [--yes]",
            cmd_category,
        ),
    ]
}

fn cmd_categories(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.require_identity()?;
    let tracker = context.tracker();
    let default = tracker.registry().default_category().to_string();
    let snapshot = tracker.snapshot();
    let names = tracker.categories();

    output::section(format!("Categories ({})", names.len()));
    for name in &names {
        let count = snapshot.count_in_category(name);
        let marker = if *name == default { " (default)" } else { "" };
        io::print_info(format!("  {name}{marker}  {count} transaction(s)"));
    }
    Ok(())
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.split_first() {
        Some((&"add", rest)) => add_category(context, rest),
        Some((&"rm", rest)) | Some((&"delete", rest)) => delete_category(context, rest),
        _ => Err(CommandError::InvalidArguments(
            "usage: category add <name> | category rm <name> [--yes]".into(),
        )),
    }
}

fn add_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require_identity()?;
    if args.is_empty() {
        return Err(CommandError::InvalidArguments("usage: category add <name>".into()));
    }
    let name = args.join(" ");
    let added = context.block_on(context.tracker().add_category(&name))?;
    io::print_success(format!("Added category \"{added}\""));
    Ok(())
}

fn delete_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[])?;
    if parsed.positionals.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: category rm <name> [--yes]".into(),
        ));
    }
    let name = parsed.positionals.join(" ");
    let pending = context.tracker().request_category_deletion(&name)?;

    if !parsed.flag("yes") {
        match context.mode() {
            CliMode::Interactive => {
                if !io::confirm_action(&context.theme, &pending.prompt(), false)? {
                    io::print_info("Cancelled.");
                    return Ok(());
                }
            }
            CliMode::Script => {
                context.print_warning(&pending.prompt());
                return Err(CommandError::InvalidArguments(
                    "pass --yes to delete without a prompt".into(),
                ));
            }
        }
    }

    let report = context.block_on(context.tracker().delete_category(pending))?;
    io::print_success(format!(
        "Deleted category \"{}\" and {} transaction(s)",
        report.category, report.removed_transactions
    ));
    Ok(())
}
