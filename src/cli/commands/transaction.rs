use fintrack_core::{EntryForm, Prediction};
use fintrack_domain::{Displayable, Transaction, TransactionKind};

use crate::cli::args::{parse_date, ParsedArgs};
use crate::cli::context::{CliMode, ShellContext};
use crate::cli::error::{CommandError, CommandResult};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;

const VALUE_OPTIONS: &[&str] = &["category", "note", "date", "type", "name", "amount"];
const SHORT_ID_LEN: usize = 8;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            "Record a transaction",
            "add <name> <amount> [--income] [--category <name>] [--note <text>] [--date YYYY-MM-DD]",
            cmd_add,
        ),
        CommandEntry::new(
            "edit",
            "Replace a transaction's fields",
            "edit <id> [--name <name>] [--amount <n>] [--type income|expense] [--category <name>] [--note <text>] [--date YYYY-MM-DD]",
            cmd_edit,
        ),
        CommandEntry::new("rm", "Delete a transaction", "rm <id>", cmd_remove),
        CommandEntry::new(
            "list",
            "List transactions, most recent first",
            "list [--category <name>] [--json]",
            cmd_list,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require_identity()?;
    if context.mode() == CliMode::Interactive && args.is_empty() {
        return run_add_wizard(context);
    }

    let parsed = ParsedArgs::parse(args, VALUE_OPTIONS)?;
    let [name, amount] = parsed.positionals.as_slice() else {
        return Err(CommandError::InvalidArguments(
            "usage: add <name> <amount> [--income] [--category <name>]".into(),
        ));
    };

    let mut form = context.tracker().new_form();
    let prediction = context.tracker().update_form_name(&mut form, name);
    form.amount = amount.to_string();
    apply_options(&mut form, &parsed)?;
    save_form(context, form, Some(&prediction))
}

fn run_add_wizard(context: &mut ShellContext) -> CommandResult {
    let name = io::prompt_text(&context.theme, "Name", None)?;
    let mut form = context.tracker().new_form();
    let prediction = context.tracker().update_form_name(&mut form, &name);

    let category = io::prompt_text(&context.theme, "Category", Some(&form.category))?;
    if category != form.category {
        form.select_category(category);
    }
    form.amount = io::prompt_text(&context.theme, "Amount", None)?;
    if io::confirm_action(&context.theme, "Is this income?", false)? {
        form.kind = TransactionKind::Income;
    }
    form.note = io::prompt_text(&context.theme, "Note", Some(""))?;
    save_form(context, form, Some(&prediction))
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, VALUE_OPTIONS)?;
    let [prefix] = parsed.positionals.as_slice() else {
        return Err(CommandError::InvalidArguments(
            "usage: edit <id> [--name <name>] [--amount <n>] ...".into(),
        ));
    };
    let stored = context.resolve_transaction(prefix)?;
    let Some(id) = stored.id.as_ref() else {
        return Err(CommandError::Message("transaction has no id yet".into()));
    };

    let mut form = context.tracker().edit_form(id)?;
    if let Some(name) = parsed.option("name") {
        form.name = name.to_string();
    }
    if let Some(amount) = parsed.option("amount") {
        form.amount = amount.to_string();
    }
    apply_options(&mut form, &parsed)?;
    save_form(context, form, None)
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [prefix] = args else {
        return Err(CommandError::InvalidArguments("usage: rm <id>".into()));
    };
    let stored = context.resolve_transaction(prefix)?;
    let Some(id) = stored.id.clone() else {
        return Err(CommandError::Message("transaction has no id yet".into()));
    };

    context.block_on(context.tracker().remove(&id))?;
    io::print_success(format!("Removed \"{}\"", stored.name));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require_identity()?;
    let parsed = ParsedArgs::parse(args, &["category"])?;
    let mut transactions = context.tracker().transactions();
    if let Some(category) = parsed.option("category") {
        transactions.retain(|txn| txn.category == category);
    }

    if parsed.flag("json") {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
        return Ok(());
    }

    output_section(format!("Transactions ({})", transactions.len()));
    if transactions.is_empty() {
        io::print_info("  (none)");
    }
    for txn in &transactions {
        io::print_info(format!("  {:<width$}  {}", short_id(txn), txn.display_label(), width = SHORT_ID_LEN));
    }
    Ok(())
}

fn apply_options(form: &mut EntryForm, parsed: &ParsedArgs<'_>) -> Result<(), CommandError> {
    if parsed.flag("income") {
        form.kind = TransactionKind::Income;
    }
    if parsed.flag("expense") {
        form.kind = TransactionKind::Expense;
    }
    if let Some(raw) = parsed.option("type") {
        form.kind = TransactionKind::parse(raw).ok_or_else(|| {
            CommandError::InvalidArguments(format!("unknown type `{raw}` (use income or expense)"))
        })?;
    }
    if let Some(category) = parsed.option("category") {
        form.select_category(category);
    }
    if let Some(note) = parsed.option("note") {
        form.note = note.to_string();
    }
    if let Some(date) = parsed.option("date") {
        form.timestamp = Some(parse_date(date)?);
    }
    Ok(())
}

fn save_form(
    context: &mut ShellContext,
    form: EntryForm,
    prediction: Option<&Prediction>,
) -> CommandResult {
    let editing = form.editing().is_some();
    let category = form.category.clone();
    let guessed = !form.user_override();
    let name = form.name.clone();

    let id = context.block_on(context.tracker().save(form))?;

    let verb = if editing { "Updated" } else { "Saved" };
    let mut message = format!("{verb} \"{name}\" in {category}");
    if let (true, Some(Prediction::Suggested { tier, .. })) = (guessed, prediction) {
        message.push_str(&format!(" (suggested from {tier})"));
    }
    io::print_success(message);
    io::print_info(format!("  id: {}", truncate_id(id.as_str())));
    Ok(())
}

fn short_id(txn: &Transaction) -> String {
    txn.id
        .as_ref()
        .map(|id| truncate_id(id.as_str()))
        .unwrap_or_default()
}

fn truncate_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}
