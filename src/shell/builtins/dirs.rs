use std::env;
use std::path::PathBuf;

use crate::shell::builtins::{self, prelude::*};

pub struct Cd;

impl builtins::BuiltinCommand for Cd {
    const NAME: &'static str = builtins::CD_NAME;

    /// `cd [dir]`: change to DIR, or to the home directory when DIR is
    /// omitted. Extra arguments are ignored.
    fn run<T: AsRef<str>>(_shell: &mut Shell, args: &[T], _stdout: &mut dyn Write) -> Result<()> {
        let dir = match args.first() {
            Some(dir) => PathBuf::from(dir.as_ref()),
            None => ::dirs::home_dir()
                .ok_or_else(|| Error::builtin_command("cd: HOME not set", 1))?,
        };

        env::set_current_dir(&dir).map_err(|e| {
            Error::builtin_command(format!("cd: {}: {}", dir.display(), e), 1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::shell::builtins::BuiltinCommand;
    use crate::shell::signals::SignalState;
    use crate::shell::ShellConfig;

    #[test]
    fn test_cd_to_missing_directory_fails() {
        let signals = Box::leak(Box::new(SignalState::new()));
        let mut shell = Shell::with_signal_state(ShellConfig::default(), signals).unwrap();
        let before = env::current_dir().unwrap();

        let err = Cd::run(&mut shell, &["/smallsh/no/such/dir"], &mut Vec::<u8>::new()).unwrap_err();
        match *err.kind() {
            ErrorKind::BuiltinCommand { ref message, code } => {
                assert!(message.starts_with("cd: /smallsh/no/such/dir: "));
                assert_eq!(code, 1);
            }
            ref other => panic!("unexpected error kind: {:?}", other),
        }
        assert!(err.is_recoverable());
        assert_eq!(env::current_dir().unwrap(), before);
    }
}
