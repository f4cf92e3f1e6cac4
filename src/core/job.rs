use std::fmt;

use nix::{
    libc,
    sys::wait::WaitStatus,
    unistd::Pid,
};

/// Identifier of a child process created by the shell. Always positive.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ProcessId(u32);

impl ProcessId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for ProcessId {
    fn from(value: u32) -> Self {
        ProcessId(value)
    }
}

impl From<Pid> for ProcessId {
    fn from(value: Pid) -> Self {
        libc::pid_t::from(value).into()
    }
}

impl From<libc::pid_t> for ProcessId {
    fn from(value: libc::pid_t) -> Self {
        ProcessId(value as u32)
    }
}

impl From<ProcessId> for Pid {
    fn from(value: ProcessId) -> Self {
        Pid::from_raw(value.0 as libc::pid_t)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a child process ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExitOutcome {
    /// The process called exit with this code.
    Exited(i32),
    /// The process was terminated by this signal number.
    Signaled(i32),
}

impl ExitOutcome {
    pub fn success() -> Self {
        ExitOutcome::Exited(0)
    }

    pub fn failure() -> Self {
        ExitOutcome::Exited(1)
    }

    /// Returns `None` for statuses that do not mean the process is gone
    /// (still alive, stopped, continued).
    pub fn from_wait_status(status: &WaitStatus) -> Option<Self> {
        match *status {
            WaitStatus::Exited(_, code) => Some(ExitOutcome::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(ExitOutcome::Signaled(signal as i32)),
            _ => None,
        }
    }

    pub fn is_signaled(self) -> bool {
        match self {
            ExitOutcome::Signaled(_) => true,
            ExitOutcome::Exited(_) => false,
        }
    }

    /// Packs the outcome into one word: exit codes stay non-negative and
    /// signal numbers are stored negated.
    pub(crate) fn to_raw(self) -> i32 {
        match self {
            ExitOutcome::Exited(code) => code,
            ExitOutcome::Signaled(signal) => -signal,
        }
    }

    pub(crate) fn from_raw(raw: i32) -> Self {
        if raw < 0 {
            ExitOutcome::Signaled(-raw)
        } else {
            ExitOutcome::Exited(raw)
        }
    }
}

impl Default for ExitOutcome {
    fn default() -> Self {
        ExitOutcome::success()
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ExitOutcome::Exited(code) => write!(f, "exit value {}", code),
            ExitOutcome::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}
