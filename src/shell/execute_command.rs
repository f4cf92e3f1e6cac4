//! Launches external commands.

use std::io;
use std::os::unix::process::CommandExt;
use std::process;

use failure::{Fail, ResultExt};
use log::{debug, warn};
use nix::{
    errno::Errno,
    libc,
    sys::wait::{self, WaitPidFlag},
    unistd::Pid,
};

use crate::core::{
    job::{ExitOutcome, ProcessId},
    parser::Command,
};
use crate::errors::{Error, ErrorKind, Result};
use crate::shell::{
    redirect::Redirection,
    signals::{self, ChildRole},
};

/// What happened to a launched command by the time control came back.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Launch {
    /// The shell waited for the child and it finished.
    Foreground(ExitOutcome),
    /// The child keeps running; the caller is responsible for tracking it.
    Background(ProcessId),
}

/// Runs `command` as a new child process.
///
/// `background` is the effective mode: the caller has already demoted the
/// request if foreground-only mode is active. A background child is left
/// running; a foreground child is waited for.
pub fn launch(command: Command, background: bool) -> Result<Launch> {
    let (argv, redirects) = command.into_parts();
    let redirection = Redirection::open(&redirects, background)?;
    let role = if background {
        ChildRole::Background
    } else {
        ChildRole::Foreground
    };

    let program = argv.program.clone();
    let mut command = process::Command::from(argv);
    command.stdin(redirection.stdin);
    command.stdout(redirection.stdout);
    unsafe {
        command.pre_exec(move || signals::reset_for_child(role).map_err(io::Error::from));
    }

    let child = command.spawn().map_err(|e| spawn_error(&program, e))?;
    let id = ProcessId::from(child.id());
    debug!("spawned {} ({}) as {:?}", program, id, role);

    if background {
        Ok(Launch::Background(id))
    } else {
        wait_for_process(id).map(Launch::Foreground)
    }
}

/// Blocks until the given child terminates. Other children are left alone.
pub fn wait_for_process(id: ProcessId) -> Result<ExitOutcome> {
    loop {
        match wait::waitpid(Pid::from(id), None) {
            Ok(status) => {
                if let Some(outcome) = ExitOutcome::from_wait_status(&status) {
                    debug!("{} finished with {}", id, outcome);
                    return Ok(outcome);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e.context(ErrorKind::Nix).into()),
        }
    }
}

/// Checks whether the given child has terminated, without blocking.
pub fn try_wait_for_process(id: ProcessId) -> Result<Option<ExitOutcome>> {
    let status =
        wait::waitpid(Pid::from(id), Some(WaitPidFlag::WNOHANG)).context(ErrorKind::Nix)?;
    Ok(ExitOutcome::from_wait_status(&status))
}

/// Exec failures stay local to the command; running out of processes or
/// memory takes the shell down.
fn spawn_error(program: &str, e: io::Error) -> Error {
    match e.raw_os_error() {
        Some(libc::EAGAIN) | Some(libc::ENOMEM) => {
            warn!("failed to create a process for {}: {}", program, e);
            e.context(ErrorKind::Spawn).into()
        }
        _ if e.kind() == io::ErrorKind::NotFound => Error::command_not_found(program),
        _ => Error::from(ErrorKind::Exec(format!("{}: {}", program, e))),
    }
}
