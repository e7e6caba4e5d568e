//! Line-oriented driver: rustyline when interactive, plain stdin lines when
//! scripted. Both feed the same dispatch loop.

use std::io::{self, Lines, StdinLock};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context, Editor, Helper, KeyEvent,
};

use crate::cli::context::{CliMode, LoopControl, ShellContext};
use crate::cli::error::{CliError, CommandError};
use crate::cli::output;

/// Set to run commands from stdin without prompts or colors.
pub const SCRIPT_ENV: &str = "FINTRACK_CLI_SCRIPT";

const CATEGORY_ACTIONS: &[&str] = &["add", "rm"];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    let mut source = match mode {
        CliMode::Interactive => LineSource::editor(context.command_names())?,
        CliMode::Script => LineSource::Script(io::stdin().lines()),
    };
    drive(&mut context, &mut source)
}

enum LineSource {
    Editor(Box<Editor<ShellHelper, DefaultHistory>>),
    Script(Lines<StdinLock<'static>>),
}

enum ReadOutcome {
    Line(String),
    Interrupted,
    Finished,
}

impl LineSource {
    fn editor(commands: Vec<&'static str>) -> Result<Self, CliError> {
        let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(ShellHelper::new(commands)));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        Ok(LineSource::Editor(Box::new(editor)))
    }

    fn read(&mut self, prompt: &str) -> Result<ReadOutcome, CliError> {
        match self {
            LineSource::Editor(editor) => match editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.trim());
                    }
                    Ok(ReadOutcome::Line(line))
                }
                Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
                Err(ReadlineError::Eof) => Ok(ReadOutcome::Finished),
                Err(err) => Err(err.into()),
            },
            LineSource::Script(lines) => match lines.next() {
                Some(line) => Ok(ReadOutcome::Line(line?)),
                None => Ok(ReadOutcome::Finished),
            },
        }
    }
}

fn drive(context: &mut ShellContext, source: &mut LineSource) -> Result<(), CliError> {
    while context.running {
        let line = match source.read(&context.prompt())? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Interrupted => {
                if context.confirm_exit()? {
                    break;
                }
                continue;
            }
            ReadOutcome::Finished => {
                if context.mode() == CliMode::Interactive {
                    output::info("Bye.");
                }
                break;
            }
        };

        match execute(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

/// Runs one input line. Blank lines and `#` comments do nothing.
fn execute(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let words = split_words(line)?;
    let Some((first, rest)) = words.split_first() else {
        return Ok(LoopControl::Continue);
    };
    if first.starts_with('#') {
        return Ok(LoopControl::Continue);
    }

    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    let control = context.dispatch(&first.to_lowercase(), first, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

pub(crate) fn split_words(line: &str) -> Result<Vec<String>, CommandError> {
    shell_words::split(line)
        .map_err(|err| CommandError::InvalidArguments(format!("could not parse input: {err}")))
}

/// Completes the command word, and the action word after `category`.
struct ShellHelper {
    commands: Vec<String>,
}

impl ShellHelper {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names.into_iter().map(str::to_string).collect();
        commands.sort_unstable();
        commands.dedup();
        Self { commands }
    }

    fn candidates(&self, before: &[&str], partial: &str) -> Vec<String> {
        let pool: Vec<&str> = match before {
            [] => self.commands.iter().map(String::as_str).collect(),
            ["category"] => CATEGORY_ACTIONS.to_vec(),
            _ => Vec::new(),
        };
        pool.into_iter()
            .filter(|word| word.starts_with(partial))
            .map(str::to_string)
            .collect()
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];
        let partial_len: usize = head
            .chars()
            .rev()
            .take_while(|ch| !ch.is_whitespace())
            .map(char::len_utf8)
            .sum();
        let start = head.len() - partial_len;
        let before: Vec<&str> = head[..start].split_whitespace().collect();
        let partial = head[start..].to_lowercase();

        let pairs = self
            .candidates(&before, &partial)
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_names_stay_together() {
        let words = split_words(r#"add "Pizza night" 12.5 --category Food"#).unwrap();
        assert_eq!(words, ["add", "Pizza night", "12.5", "--category", "Food"]);
    }

    #[test]
    fn unbalanced_quotes_are_invalid_arguments() {
        let err = split_words(r#"add "Pizza 12"#).unwrap_err();
        assert!(matches!(err, CommandError::InvalidArguments(_)));
    }

    #[test]
    fn completes_commands_then_category_actions() {
        let helper = ShellHelper::new(vec!["list", "login", "category", "list"]);

        assert_eq!(helper.commands, ["category", "list", "login"]);
        assert_eq!(helper.candidates(&[], "l"), ["list", "login"]);
        assert_eq!(helper.candidates(&["category"], "r"), ["rm"]);
        assert!(helper.candidates(&["list"], "x").is_empty());
    }
}
