use std::ffi::OsStr;
use std::process;

/// One parsed command line: `command [arg]* [< input] [> output] [&]`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Command {
    pub program: String,
    pub args: Vec<String>,
    pub input: Option<String>,
    pub output: Option<String>,
    pub background: bool,
}

impl Command {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Command {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Splits the command into its argument vector and its redirections,
    /// giving both away.
    pub fn into_parts(self) -> (Argv, Redirects) {
        (
            Argv {
                program: self.program,
                args: self.args,
            },
            Redirects {
                input: self.input,
                output: self.output,
                background: self.background,
            },
        )
    }
}

/// Program name plus arguments; argument 0 is the program itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Argv {
    pub program: String,
    pub args: Vec<String>,
}

impl From<Argv> for process::Command {
    fn from(argv: Argv) -> Self {
        let mut command = process::Command::new(OsStr::new(&argv.program));
        command.args(argv.args);
        command
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Redirects {
    pub input: Option<String>,
    pub output: Option<String>,
    pub background: bool,
}
