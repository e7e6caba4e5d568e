use std::{future::Future, sync::Arc, time::Duration};

use dialoguer::theme::ColorfulTheme;
use fintrack_domain::{Identity, Transaction};
use fintrack_remote_memory::LocalIdentityProvider;
use strsim::damerau_levenshtein;
use tokio::runtime::{Builder, Runtime};

use fintrack_core::SessionHandle;

use crate::{
    bootstrap::{base_dir_from_env, open_workspace, Workspace},
    cli::{
        commands,
        error::{CliError, CommandError},
        io as cli_io, output,
        registry::CommandRegistry,
    },
    utils, Tracker,
};

/// Extra time on top of the cold-start wait for a session change to settle.
const SESSION_GRACE: Duration = Duration::from_secs(2);
const SUGGESTION_DISTANCE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub workspace: Workspace,
    pub running: bool,
    identity: Arc<LocalIdentityProvider>,
    // Dropped before the runtime it was spawned on.
    session: Option<SessionHandle>,
    runtime: Runtime,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let workspace = open_workspace(base_dir_from_env())?;
        utils::init_tracing_with(&workspace.config.log_filter);
        output::set_plain(mode == CliMode::Script);

        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let identity = Arc::new(LocalIdentityProvider::default());
        let session = {
            let _guard = runtime.enter();
            workspace.tracker.follow(identity.clone())
        };

        let mut app = ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            workspace,
            running: true,
            identity,
            session: Some(session),
            runtime,
        };
        app.resume_last_session();
        Ok(app)
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub fn tracker(&self) -> &Tracker {
        &self.workspace.tracker
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn prompt(&self) -> String {
        match self.tracker().identity() {
            Some(identity) => format!("fintrack({identity})> "),
            None => "fintrack> ".to_string(),
        }
    }

    pub(crate) fn require_identity(&self) -> Result<Identity, CommandError> {
        self.tracker().identity().ok_or(CommandError::NotSignedIn)
    }

    /// Signs in through the identity provider and waits for both stores to
    /// load. The identity is remembered for the next start.
    pub(crate) fn sign_in(&mut self, identity: Identity) -> Result<(), CommandError> {
        self.identity.sign_in(identity.clone());
        if !self.wait_for_session(Some(&identity)) {
            cli_io::print_warning("Still syncing; data may appear shortly.");
        }
        self.workspace.config.last_identity = Some(identity.as_str().to_string());
        self.workspace.save_config()?;
        Ok(())
    }

    pub(crate) fn sign_out(&mut self) -> Result<(), CommandError> {
        self.identity.sign_out();
        self.wait_for_session(None);
        self.workspace.config.last_identity = None;
        self.workspace.save_config()?;
        Ok(())
    }

    fn wait_for_session(&self, expected: Option<&Identity>) -> bool {
        let within = self.tracker().settings().cold_start_wait + SESSION_GRACE;
        self.block_on(self.tracker().wait_for_session(expected, within))
    }

    fn resume_last_session(&mut self) {
        let Some(last) = self.workspace.config.last_identity.clone() else {
            return;
        };
        let identity = Identity::new(last);
        self.identity.sign_in(identity.clone());
        if !self.wait_for_session(Some(&identity)) {
            cli_io::print_warning(format!("Could not restore the session for `{identity}`."));
        }
    }

    /// Finds the projected transaction whose id starts with `prefix`.
    pub(crate) fn resolve_transaction(&self, prefix: &str) -> Result<Transaction, CommandError> {
        self.require_identity()?;
        let mut matches: Vec<Transaction> = self
            .tracker()
            .transactions()
            .into_iter()
            .filter(|txn| {
                txn.id
                    .as_ref()
                    .is_some_and(|id| id.as_str().starts_with(prefix))
            })
            .collect();
        if matches.len() > 1 {
            return Err(CommandError::InvalidArguments(format!(
                "id `{prefix}` matches {} transactions; use more characters",
                matches.len()
            )));
        }
        matches.pop().ok_or_else(|| {
            CommandError::InvalidArguments(format!("no transaction with id `{prefix}`"))
        })
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.handler(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        match handler(self, args) {
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            outcome => outcome.map(|()| LoopControl::Continue),
        }
    }

    /// Warns about an unknown command and offers the closest known name.
    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));

        let closest = self
            .registry
            .names()
            .map(|name| (damerau_levenshtein(name, &input.to_lowercase()), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((_, name)) = closest.filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE) {
            cli_io::print_info(format!("Suggestion: `{name}`?"));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                cli_io::print_info("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::NotSignedIn => {
                cli_io::print_error("Not signed in. Use `login <name>` first.");
                cli_io::print_info("Try `login alice` to get started.");
                Ok(())
            }
            other => {
                cli_io::print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }
}

impl Drop for ShellContext {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.runtime.block_on(session.shutdown());
        }
    }
}
