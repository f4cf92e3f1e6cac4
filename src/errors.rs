//! Error module. See the [failure](https://crates.io/crates/failure) crate for details.

use std::fmt;
use std::result;

use failure::{Backtrace, Context, Fail};

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    ctx: Context<ErrorKind>,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.ctx.get_context()
    }

    /// Returns `true` if the dispatcher can report this error and keep going.
    ///
    /// Only a failure to create a process (or an unexpected OS error) takes
    /// the whole shell down.
    pub fn is_recoverable(&self) -> bool {
        match *self.kind() {
            ErrorKind::Syntax(_)
            | ErrorKind::BuiltinCommand { .. }
            | ErrorKind::CommandNotFound(_)
            | ErrorKind::Exec(_)
            | ErrorKind::Redirect(_) => true,
            ErrorKind::Spawn | ErrorKind::Io | ErrorKind::Nix => false,
        }
    }

    pub(crate) fn syntax<T: AsRef<str>>(message: T) -> Error {
        Error::from(ErrorKind::Syntax(message.as_ref().to_string()))
    }

    pub(crate) fn builtin_command<T: AsRef<str>>(message: T, code: i32) -> Error {
        Error::from(ErrorKind::BuiltinCommand {
            message: message.as_ref().to_string(),
            code,
        })
    }

    pub(crate) fn command_not_found<T: AsRef<str>>(command: T) -> Error {
        Error::from(ErrorKind::CommandNotFound(command.as_ref().to_string()))
    }

    pub(crate) fn redirect<T: AsRef<str>>(message: T) -> Error {
        Error::from(ErrorKind::Redirect(message.as_ref().to_string()))
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.ctx.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.ctx.backtrace()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.ctx, f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Syntax(String),
    BuiltinCommand { message: String, code: i32 },
    CommandNotFound(String),
    Exec(String),
    Redirect(String),
    Spawn,
    Io,
    Nix,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ErrorKind::Syntax(ref message) => write!(f, "syntax error: {}", message),
            ErrorKind::BuiltinCommand { ref message, .. } => write!(f, "{}", message),
            ErrorKind::CommandNotFound(ref command) => {
                write!(f, "{}: no such file or directory", command)
            }
            ErrorKind::Exec(ref message) => write!(f, "{}", message),
            ErrorKind::Redirect(ref message) => write!(f, "{}", message),
            ErrorKind::Spawn => write!(f, "failed to create a new process"),
            ErrorKind::Io => write!(f, "I/O error occurred"),
            ErrorKind::Nix => write!(f, "Nix error occurred"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error::from(Context::new(kind))
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(ctx: Context<ErrorKind>) -> Error {
        Error { ctx }
    }
}
