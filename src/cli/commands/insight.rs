use fintrack_core::{Prediction, SummaryService};

use crate::cli::context::ShellContext;
use crate::cli::error::{CommandError, CommandResult};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "predict",
            "Suggest a category for a transaction name",
            "predict <text...>",
            cmd_predict,
        ),
        CommandEntry::new(
            "summary",
            "Show income, expenses and savings",
            "summary [--by-category]",
            cmd_summary,
        ),
    ]
}

fn cmd_predict(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments("usage: predict <text...>".into()));
    }
    let input = args.join(" ");
    match context.tracker().suggest_category(&input) {
        Prediction::Suggested { category, tier } => {
            io::print_info(format!("Suggested category: {category} ({tier})"));
        }
        Prediction::NoSuggestion => io::print_info("No suggestion"),
    }
    Ok(())
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require_identity()?;
    let summary = context.tracker().summary();

    output::section("Summary");
    io::print_info(format!("  Transactions:   {}", summary.transaction_count));
    io::print_info(format!("  Total income:   {:.2}", summary.total_income));
    io::print_info(format!("  Total expenses: {:.2}", summary.total_expenses));
    io::print_info(format!("  Savings:        {:.2}", summary.savings));
    io::print_info(format!("  Savings ratio:  {:.1}%", summary.savings_ratio));
    match &summary.highest_spending_category {
        Some(top) => io::print_info(format!(
            "  Top spending:   {} ({:.2} across {} transaction(s))",
            top.category, top.amount, top.count
        )),
        None => io::print_info("  Top spending:   none"),
    }

    if args.contains(&"--by-category") {
        let snapshot = context.tracker().snapshot();
        output::section("By category");
        for total in SummaryService::totals_by_category(snapshot.transactions()) {
            io::print_info(format!(
                "  {:<16} {:>10.2}  ({})",
                total.category, total.amount, total.count
            ));
        }
    }
    Ok(())
}
