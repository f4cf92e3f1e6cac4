use crate::shell::builtins::{self, prelude::*};

pub struct Exit;

impl builtins::BuiltinCommand for Exit {
    const NAME: &'static str = builtins::EXIT_NAME;

    /// Arguments are ignored. The dispatcher stops after this line and the
    /// shell kills its background jobs on the way out.
    fn run<T: AsRef<str>>(shell: &mut Shell, _args: &[T], _stdout: &mut dyn Write) -> Result<()> {
        shell.request_exit();
        Ok(())
    }
}
