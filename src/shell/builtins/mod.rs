//! Smallsh builtins
//!
//! `exit`, `cd`, and `status` run inside the shell process. They never fork,
//! ignore redirection and `&`, and leave the last foreground status alone.

use self::prelude::*;

use self::dirs::Cd;
use self::exit::Exit;
use self::status::Status;

pub mod prelude {
    pub use std::io::Write;

    pub use failure::ResultExt;

    pub use crate::errors::{Error, ErrorKind, Result};
    pub use crate::shell::shell::Shell;
}

mod dirs;
mod exit;
mod status;

const CD_NAME: &str = "cd";
const EXIT_NAME: &str = "exit";
const STATUS_NAME: &str = "status";

/// Represents a Smallsh builtin command such as cd or status.
pub trait BuiltinCommand {
    /// The NAME of the command.
    const NAME: &'static str;
    /// Runs the command with the given arguments in the `shell` environment.
    fn run<T: AsRef<str>>(shell: &mut Shell, args: &[T], stdout: &mut dyn Write) -> Result<()>;
}

pub fn is_builtin<T: AsRef<str>>(program: T) -> bool {
    [CD_NAME, EXIT_NAME, STATUS_NAME].contains(&program.as_ref())
}

/// precondition: command is a builtin.
pub fn run<S1, S2>(shell: &mut Shell, program: S1, args: &[S2], stdout: &mut dyn Write) -> Result<()>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    debug_assert!(is_builtin(&program));

    match program.as_ref() {
        CD_NAME => Cd::run(shell, args, stdout),
        EXIT_NAME => Exit::run(shell, args, stdout),
        STATUS_NAME => Status::run(shell, args, stdout),
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_builtin() {
        assert!(is_builtin("cd"));
        assert!(is_builtin("exit"));
        assert!(is_builtin("status"));
        assert!(!is_builtin("ls"));
        assert!(!is_builtin("jobs"));
    }
}
