use fintrack_domain::Identity;

use crate::cli::context::ShellContext;
use crate::cli::error::{CommandError, CommandResult};
use crate::cli::io;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("login", "Sign in as a user", "login <name>", cmd_login),
        CommandEntry::new("logout", "Sign out", "logout", cmd_logout),
        CommandEntry::new("whoami", "Show the signed-in user", "whoami", cmd_whoami),
    ]
}

fn cmd_login(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name] = args else {
        return Err(CommandError::InvalidArguments("usage: login <name>".into()));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::InvalidArguments("user name is required".into()));
    }
    context.sign_in(Identity::new(name))?;

    let tracker = context.tracker();
    io::print_success(format!(
        "Signed in as {name} ({} transaction(s), {} categories)",
        tracker.transactions().len(),
        tracker.categories().len()
    ));
    Ok(())
}

fn cmd_logout(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let identity = context.require_identity()?;
    context.sign_out()?;
    io::print_success(format!("Signed out {identity}"));
    Ok(())
}

fn cmd_whoami(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    match context.tracker().identity() {
        Some(identity) => io::print_info(format!("Signed in as {identity}")),
        None => io::print_info("Not signed in"),
    }
    Ok(())
}
