use std::io;

use fintrack_config::ConfigError;
use fintrack_core::CoreError;
use rustyline::error::ReadlineError;
use thiserror::Error;

use crate::BootstrapError;

/// Failures that end the shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Command(String),
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures of a single command. Reported and the shell keeps going.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Not signed in. Use `login <name>` first.")]
    NotSignedIn,
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Core(CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthRequired => CommandError::NotSignedIn,
            other => CommandError::Core(other),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

pub type CommandResult = Result<(), CommandError>;
