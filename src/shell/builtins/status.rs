use crate::shell::builtins::{self, prelude::*};

pub struct Status;

impl builtins::BuiltinCommand for Status {
    const NAME: &'static str = builtins::STATUS_NAME;

    fn run<T: AsRef<str>>(shell: &mut Shell, _args: &[T], stdout: &mut dyn Write) -> Result<()> {
        writeln!(stdout, "{}", shell.last_status()).context(ErrorKind::Io)?;
        stdout.flush().context(ErrorKind::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempdir::TempDir;

    use crate::shell::builtins::BuiltinCommand;
    use crate::shell::signals::SignalState;
    use crate::shell::ShellConfig;

    fn test_shell() -> Shell {
        let signals = Box::leak(Box::new(SignalState::new()));
        Shell::with_signal_state(ShellConfig::default(), signals).unwrap()
    }

    fn status_output(shell: &mut Shell) -> String {
        let mut stdout: Vec<u8> = Vec::new();
        Status::run::<&str>(shell, &[], &mut stdout).unwrap();
        String::from_utf8(stdout).unwrap()
    }

    fn run_script(shell: &mut Shell, body: &str) {
        let dir = TempDir::new("smallsh-status").unwrap();
        let script = dir.path().join("script.sh");
        fs::write(&script, body).unwrap();
        shell
            .execute_command_string(&format!("sh {}", script.display()))
            .unwrap();
    }

    #[test]
    fn test_status_before_any_command() {
        let mut shell = test_shell();
        assert_eq!(status_output(&mut shell), "exit value 0\n");
    }

    #[test]
    fn test_status_reports_exit_code() {
        let mut shell = test_shell();
        run_script(&mut shell, "exit 3\n");
        assert_eq!(status_output(&mut shell), "exit value 3\n");
    }

    #[test]
    fn test_status_reports_signal() {
        let mut shell = test_shell();
        run_script(&mut shell, "kill -9 $$\n");
        assert_eq!(status_output(&mut shell), "terminated by signal 9\n");
    }

    #[test]
    fn test_status_reports_interrupt() {
        let mut shell = test_shell();
        run_script(&mut shell, "kill -INT $$\n");
        assert_eq!(status_output(&mut shell), "terminated by signal 2\n");
    }

    #[test]
    fn test_builtins_do_not_change_status() {
        let mut shell = test_shell();
        shell.execute_command_string("false").unwrap();
        shell
            .execute_command_string("cd /smallsh/no/such/dir")
            .unwrap();
        assert_eq!(status_output(&mut shell), "exit value 1\n");
    }
}
