//! Smallsh - Shell Module
//!
//! The Shell runs the read-dispatch loop. Each iteration reports finished
//! background jobs, reads one line, and hands the parsed command to a builtin
//! or to the launcher.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process;
use std::ptr;

use failure::{Fail, ResultExt};
use log::{debug, error, info, warn};

use super::{
    builtins,
    execute_command::{self, Launch},
    job_control::JobTable,
    signals::{self, SignalState, SIGNAL_STATE},
    ShellConfig,
};
use crate::core::{job::ExitOutcome, parser::Command, variable_expansion};
use crate::errors::{Error, ErrorKind, Result};

/// Smallsh Shell
pub struct Shell {
    config: ShellConfig,
    /// Background children that have not been reaped yet.
    jobs: JobTable,
    /// Foreground-only flag and last foreground status.
    signals: &'static SignalState,
    /// Our own pid, substituted for `$$`.
    pid: String,
    /// Set by the `exit` builtin.
    exit_requested: bool,
}

impl Shell {
    /// Constructs a new Shell bound to the process-wide signal state.
    pub fn new(config: ShellConfig) -> Result<Shell> {
        Shell::with_signal_state(config, &SIGNAL_STATE)
    }

    /// Constructs a Shell that records its foreground-only mode and last
    /// status in `signals`.
    ///
    /// The SIGTSTP handler only ever flips `SIGNAL_STATE`, so handlers are
    /// installed only when `signals` is that instance.
    pub(crate) fn with_signal_state(
        config: ShellConfig,
        signals: &'static SignalState,
    ) -> Result<Shell> {
        if config.handle_signals {
            if ptr::eq(signals, &SIGNAL_STATE) {
                signals::install_shell_handlers()?;
            } else {
                warn!("private signal state, leaving signal dispositions alone");
            }
        }

        let shell = Shell {
            config,
            jobs: JobTable::with_capacity(config.job_table_capacity),
            signals,
            pid: process::id().to_string(),
            exit_requested: false,
        };

        info!("smallsh started up");
        Ok(shell)
    }

    /// Status of the last foreground command that was not a builtin.
    pub fn last_status(&self) -> ExitOutcome {
        self.signals.last_status()
    }

    pub fn is_foreground_only(&self) -> bool {
        self.signals.is_foreground_only()
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    /// Returns `true` once `exit` has been run.
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub(crate) fn request_exit(&mut self) {
        debug!("exit requested");
        self.exit_requested = true;
    }

    /// Writes the prompt and reads one line from stdin, without its newline.
    /// Returns `None` when end of file is reached.
    fn prompt(&mut self) -> Result<Option<String>> {
        if self.config.display_prompt {
            let mut stdout = io::stdout();
            write!(stdout, "{}", self.config.prompt()).context(ErrorKind::Io)?;
            stdout.flush().context(ErrorKind::Io)?;
        }

        let mut line = String::new();
        loop {
            match io::stdin().lock().read_line(&mut line) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.context(ErrorKind::Io).into()),
            }
        }

        let len = line.trim_end_matches(&['\n', '\r'][..]).len();
        line.truncate(len);
        Ok(Some(line))
    }

    /// Runs one line: expands `$$`, parses, and dispatches.
    ///
    /// Errors the user can fix are reported here and swallowed; only fatal
    /// errors are returned.
    pub fn execute_command_string(&mut self, input: &str) -> Result<()> {
        let line = variable_expansion::expand_pid(input, &self.pid);
        let command = match Command::parse(&line, self.config.max_arguments()) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(()),
            Err(e) => return self.report_if_recoverable(e),
        };

        if builtins::is_builtin(&command.program) {
            match builtins::run(self, &command.program, &command.args[..], &mut io::stdout()) {
                Ok(()) => Ok(()),
                Err(e) => self.report_if_recoverable(e),
            }
        } else {
            self.execute_command(command)
        }
    }

    /// Runs a smallsh script from a file, one line at a time, stopping at
    /// `exit`.
    pub fn execute_commands_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let file = File::open(path).context(ErrorKind::Io)?;
        for line in BufReader::new(file).lines() {
            let line = line.context(ErrorKind::Io)?;
            self.do_job_notification();
            self.execute_command_string(&line)?;
            if self.exit_requested {
                self.terminate_jobs();
                break;
            }
        }

        Ok(())
    }

    /// Runs lines from stdin until `exit` or end of file. Either way the
    /// background jobs are killed before returning.
    pub fn execute_from_stdin(&mut self) -> Result<()> {
        loop {
            self.do_job_notification();

            let line = match self.prompt()? {
                Some(line) => line,
                None => {
                    debug!("end of input");
                    break;
                }
            };

            self.execute_command_string(&line)?;
            if self.exit_requested {
                break;
            }
        }

        self.terminate_jobs();
        Ok(())
    }

    /// Reports and forgets background jobs that have finished.
    pub fn do_job_notification(&mut self) {
        for (id, outcome) in self.jobs.reap_all_nonblocking() {
            notify(format_args!("background pid {} is done: {}", id, outcome));
        }
    }

    /// Launches an external command, waiting for it unless it really runs
    /// in the background.
    fn execute_command(&mut self, command: Command) -> Result<()> {
        let background = command.background && !self.is_foreground_only();
        if command.background && !background {
            debug!("foreground-only mode, running {} in the foreground", command.program);
        }

        let temp_result = io::stdout().flush();
        log_if_err!(temp_result, "failed to flush stdout before launch");

        match execute_command::launch(command, background) {
            Ok(Launch::Background(id)) => {
                self.jobs.register(id);
                notify(format_args!("background pid is {}", id));
                Ok(())
            }
            Ok(Launch::Foreground(outcome)) => {
                self.signals.set_last_status(outcome);
                if outcome.is_signaled() {
                    notify(format_args!("{}", outcome));
                }
                Ok(())
            }
            Err(e) => {
                if e.is_recoverable() {
                    self.signals.set_last_status(ExitOutcome::failure());
                }
                self.report_if_recoverable(e)
            }
        }
    }

    fn report_if_recoverable(&self, e: Error) -> Result<()> {
        if e.is_recoverable() {
            debug!("recoverable error: {:?}", e.kind());
            eprintln!("smallsh: {}", e);
            Ok(())
        } else {
            error!("fatal error: {}", e);
            Err(e)
        }
    }

    /// Kills every tracked background job without waiting for them.
    pub fn terminate_jobs(&mut self) {
        self.jobs.terminate_all();
    }

    /// Exit the shell with `code`, killing background jobs first.
    pub fn exit(&mut self, code: i32) -> ! {
        self.terminate_jobs();
        let temp_result = io::stdout().flush();
        log_if_err!(temp_result, "failed to flush stdout during shutdown");

        info!("smallsh has shut down");
        process::exit(code);
    }
}

/// Writes one line of shell chatter to stdout. A closed stdout is logged, not
/// fatal.
fn notify(message: fmt::Arguments<'_>) {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let temp_result = stdout.write_fmt(message).and_then(|()| stdout.write_all(b"\n"));
    log_if_err!(temp_result, "failed to write to stdout");
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pid: {}\tforeground only: {}\n{:?}",
            self.pid,
            self.is_foreground_only(),
            self.jobs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::thread;
    use std::time::{Duration, Instant};

    use nix::sys::signal::{self, Signal};
    use nix::sys::wait::{self, WaitStatus};
    use nix::unistd::Pid;
    use tempdir::TempDir;

    use crate::core::job::ProcessId;

    fn test_shell() -> Shell {
        let signals = Box::leak(Box::new(SignalState::new()));
        Shell::with_signal_state(ShellConfig::default(), signals).unwrap()
    }

    fn live_jobs(shell: &Shell) -> Vec<ProcessId> {
        shell.jobs().live().collect()
    }

    fn expect_killed(id: ProcessId) {
        match wait::waitpid(Pid::from(id), None).unwrap() {
            WaitStatus::Signaled(_, Signal::SIGKILL, _) => (),
            other => panic!("{} was not killed: {:?}", id, other),
        }
    }

    #[test]
    fn test_blank_and_comment_lines_do_nothing() {
        let mut shell = test_shell();
        shell.execute_command_string("").unwrap();
        shell.execute_command_string("# note").unwrap();
        assert!(shell.jobs().is_empty());
        assert_eq!(shell.last_status(), ExitOutcome::Exited(0));
        assert!(!shell.exit_requested());
    }

    #[test]
    fn test_foreground_status_is_recorded() {
        let mut shell = test_shell();
        shell.execute_command_string("false").unwrap();
        assert_eq!(shell.last_status(), ExitOutcome::Exited(1));
        shell.execute_command_string("true").unwrap();
        assert_eq!(shell.last_status(), ExitOutcome::Exited(0));
    }

    #[test]
    fn test_pid_is_expanded() {
        let dir = TempDir::new("smallsh-shell").unwrap();
        let out = dir.path().join("pid$$");

        let mut shell = test_shell();
        shell
            .execute_command_string(&format!("echo $$ > {}", out.display()))
            .unwrap();

        let pid = process::id().to_string();
        let expanded = dir.path().join(format!("pid{}", pid));
        assert_eq!(fs::read_to_string(expanded).unwrap(), format!("{}\n", pid));
    }

    #[test]
    fn test_user_errors_are_recoverable() {
        let mut shell = test_shell();

        shell.execute_command_string("cat <").unwrap();
        assert_eq!(shell.last_status(), ExitOutcome::Exited(0));

        shell
            .execute_command_string("smallsh-no-such-command arg")
            .unwrap();
        assert_eq!(shell.last_status(), ExitOutcome::Exited(1));

        shell.execute_command_string("true").unwrap();
        shell
            .execute_command_string("cat < /smallsh/no/such/file")
            .unwrap();
        assert_eq!(shell.last_status(), ExitOutcome::Exited(1));
    }

    #[test]
    fn test_exit_requests_stop() {
        let mut shell = test_shell();
        shell.execute_command_string("exit now please").unwrap();
        assert!(shell.exit_requested());
    }

    #[test]
    fn test_background_jobs_are_tracked_and_terminated() {
        let mut shell = test_shell();
        shell.execute_command_string("sleep 30 &").unwrap();
        shell.execute_command_string("sleep 30 &").unwrap();

        let jobs = live_jobs(&shell);
        assert_eq!(jobs.len(), 2);

        shell.terminate_jobs();
        assert!(shell.jobs().is_empty());
        for id in jobs {
            expect_killed(id);
        }
    }

    #[test]
    fn test_finished_background_jobs_are_reaped() {
        let mut shell = test_shell();
        shell.execute_command_string("true &").unwrap();
        assert_eq!(shell.jobs().len(), 1);

        let deadline = Instant::now() + Duration::from_secs(10);
        while !shell.jobs().is_empty() {
            assert!(Instant::now() < deadline, "background job was never reaped");
            thread::sleep(Duration::from_millis(10));
            shell.do_job_notification();
        }
    }

    #[test]
    fn test_foreground_only_mode_demotes_background_requests() {
        let signals = Box::leak(Box::new(SignalState::new()));
        let mut shell = Shell::with_signal_state(ShellConfig::default(), signals).unwrap();

        signals.toggle_foreground_only();
        assert!(shell.is_foreground_only());
        shell.execute_command_string("false &").unwrap();
        assert!(shell.jobs().is_empty());
        assert_eq!(shell.last_status(), ExitOutcome::Exited(1));

        signals.toggle_foreground_only();
        shell.execute_command_string("sleep 30 &").unwrap();
        assert_eq!(shell.jobs().len(), 1);

        let jobs = live_jobs(&shell);
        shell.terminate_jobs();
        expect_killed(jobs[0]);
    }

    #[test]
    fn test_toggle_leaves_running_jobs_alone() {
        let signals = Box::leak(Box::new(SignalState::new()));
        let mut shell = Shell::with_signal_state(ShellConfig::default(), signals).unwrap();

        shell.execute_command_string("sleep 30 &").unwrap();
        let jobs = live_jobs(&shell);
        signals.toggle_foreground_only();
        shell.do_job_notification();
        assert_eq!(live_jobs(&shell), jobs);

        shell.terminate_jobs();
        expect_killed(jobs[0]);
    }

    #[test]
    fn test_job_table_grows_past_configured_capacity() {
        let signals = Box::leak(Box::new(SignalState::new()));
        let config = ShellConfig::default().with_job_table_capacity(1);
        let mut shell = Shell::with_signal_state(config, signals).unwrap();
        assert_eq!(shell.jobs().capacity(), 1);

        for _ in 0..3 {
            shell.execute_command_string("sleep 30 &").unwrap();
        }
        assert_eq!(shell.jobs().len(), 3);
        assert_eq!(shell.jobs().capacity(), 4);

        let jobs = live_jobs(&shell);
        shell.terminate_jobs();
        for id in jobs {
            expect_killed(id);
        }
    }

    #[test]
    fn test_suspend_toggles_mode_seen_by_shell() {
        let shell = Shell::new(ShellConfig::noninteractive()).unwrap();
        assert!(!shell.is_foreground_only());

        signal::raise(Signal::SIGTSTP).unwrap();
        assert!(shell.is_foreground_only());

        signal::raise(Signal::SIGTSTP).unwrap();
        assert!(!shell.is_foreground_only());
    }

    #[test]
    fn test_private_signal_state_skips_handlers() {
        let signals = Box::leak(Box::new(SignalState::new()));
        let shell = Shell::with_signal_state(ShellConfig::noninteractive(), signals).unwrap();
        assert!(!shell.is_foreground_only());
        assert!(!ptr::eq(shell.signals, &SIGNAL_STATE));
    }

    #[test]
    fn test_foreground_interrupt_is_recorded() {
        let dir = TempDir::new("smallsh-shell").unwrap();
        let script = dir.path().join("interrupt.sh");
        fs::write(&script, "kill -INT $$\n").unwrap();

        let mut shell = test_shell();
        shell
            .execute_command_string(&format!("sh {}", script.display()))
            .unwrap();
        assert_eq!(shell.last_status(), ExitOutcome::Signaled(2));
    }

    #[test]
    fn test_exit_in_script_kills_background_jobs() {
        let dir = TempDir::new("smallsh-shell").unwrap();
        let script = dir.path().join("exit.smallsh");
        fs::write(&script, "exit\necho unreachable\n").unwrap();

        let mut shell = test_shell();
        shell.execute_command_string("sleep 30 &").unwrap();
        let jobs = live_jobs(&shell);
        assert_eq!(jobs.len(), 1);

        shell.execute_commands_from_file(&script).unwrap();
        assert!(shell.exit_requested());
        assert!(shell.jobs().is_empty());
        expect_killed(jobs[0]);
    }

    #[test]
    fn test_argument_limit_comes_from_config() {
        let signals = Box::leak(Box::new(SignalState::new()));
        let config = ShellConfig::default().with_max_arguments(1);
        let mut shell = Shell::with_signal_state(config, signals).unwrap();

        shell.execute_command_string("false a b").unwrap();
        assert_eq!(shell.last_status(), ExitOutcome::Exited(0));
        shell.execute_command_string("false a").unwrap();
        assert_eq!(shell.last_status(), ExitOutcome::Exited(1));
    }
}
