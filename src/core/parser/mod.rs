//! Smallsh Parser
//!
//! Lines are split on spaces with no quoting. After the program name come
//! its arguments, then optionally `< file`, `> file`, and `&`, in that order.

use log::debug;

use crate::errors::{Error, Result};

pub use self::ast::{Argv, Command, Redirects};

pub mod ast;

const INPUT_MARKER: &str = "<";
const OUTPUT_MARKER: &str = ">";
const BACKGROUND_MARKER: &str = "&";
const COMMENT_PREFIX: char = '#';

impl Command {
    /// Parses an already-expanded line.
    ///
    /// Returns `Ok(None)` for blank lines and comments. At most `max_args`
    /// arguments are accepted.
    pub fn parse(line: &str, max_args: usize) -> Result<Option<Command>> {
        if line.starts_with(COMMENT_PREFIX) {
            return Ok(None);
        }

        let mut tokens = line.split(' ').filter(|t| !t.is_empty()).peekable();
        let program = match tokens.next() {
            Some(program) => program,
            None => return Ok(None),
        };
        let mut command = Command::new(program);

        while let Some(token) = tokens.next_if(|t| !is_marker(t)) {
            if command.args.len() == max_args {
                return Err(Error::syntax(format!(
                    "too many arguments (limit is {})",
                    max_args
                )));
            }
            command.args.push(token.to_string());
        }

        if tokens.next_if_eq(&INPUT_MARKER).is_some() {
            command.input = Some(redirect_target(tokens.next(), INPUT_MARKER)?);
        }
        if tokens.next_if_eq(&OUTPUT_MARKER).is_some() {
            command.output = Some(redirect_target(tokens.next(), OUTPUT_MARKER)?);
        }
        if tokens.next_if_eq(&BACKGROUND_MARKER).is_some() {
            command.background = true;
        }

        if let Some(token) = tokens.next() {
            return Err(Error::syntax(format!("unexpected token '{}'", token)));
        }

        debug!("parsed Command: {:?}", command);
        Ok(Some(command))
    }
}

fn is_marker(token: &str) -> bool {
    token == INPUT_MARKER || token == OUTPUT_MARKER || token == BACKGROUND_MARKER
}

fn redirect_target(token: Option<&str>, marker: &str) -> Result<String> {
    match token {
        Some(path) if !is_marker(path) => Ok(path.to_string()),
        _ => Err(Error::syntax(format!("missing file after '{}'", marker))),
    }
}
