//! Signal handling for the shell and its children.
//!
//! The shell ignores SIGINT for its whole lifetime and uses SIGTSTP to toggle
//! foreground-only mode. Children ignore SIGTSTP; foreground children get the
//! default SIGINT action back so Ctrl-C kills them, background children keep
//! ignoring it.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use failure::ResultExt;
use log::debug;
use nix::{
    libc,
    sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal},
    unistd,
};

use crate::core::job::ExitOutcome;
use crate::errors::{ErrorKind, Result};

pub const ENTER_FOREGROUND_ONLY_MESSAGE: &str =
    "\nEntering foreground-only mode (& is now ignored)\n";
pub const EXIT_FOREGROUND_ONLY_MESSAGE: &str = "\nExiting foreground-only mode\n";

/// The process-wide instance the SIGTSTP handler writes to.
pub static SIGNAL_STATE: SignalState = SignalState::new();

/// State shared between the dispatcher and the signal handler.
///
/// Both fields are single atomic words so they can be touched from a signal
/// handler.
#[derive(Debug)]
pub struct SignalState {
    foreground_only: AtomicBool,
    last_status: AtomicI32,
}

impl SignalState {
    pub const fn new() -> Self {
        SignalState {
            foreground_only: AtomicBool::new(false),
            last_status: AtomicI32::new(0),
        }
    }

    pub fn is_foreground_only(&self) -> bool {
        self.foreground_only.load(Ordering::SeqCst)
    }

    /// Flips foreground-only mode and returns the message announcing the new
    /// mode. Safe to call from a signal handler.
    pub fn toggle_foreground_only(&self) -> &'static str {
        let was_foreground_only = self.foreground_only.fetch_xor(true, Ordering::SeqCst);
        if was_foreground_only {
            EXIT_FOREGROUND_ONLY_MESSAGE
        } else {
            ENTER_FOREGROUND_ONLY_MESSAGE
        }
    }

    pub fn last_status(&self) -> ExitOutcome {
        ExitOutcome::from_raw(self.last_status.load(Ordering::SeqCst))
    }

    pub fn set_last_status(&self, outcome: ExitOutcome) {
        self.last_status.store(outcome.to_raw(), Ordering::SeqCst);
    }
}

impl Default for SignalState {
    fn default() -> Self {
        SignalState::new()
    }
}

/// Which kind of child is about to replace its image.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChildRole {
    Foreground,
    Background,
}

extern "C" fn handle_sigtstp(_: libc::c_int) {
    let message = SIGNAL_STATE.toggle_foreground_only();
    // write(2) is async-signal-safe; nothing here allocates or locks
    let _ = unistd::write(libc::STDOUT_FILENO, message.as_bytes());
}

/// Installs the shell's own dispositions: SIGINT ignored, SIGTSTP toggles
/// foreground-only mode.
pub fn install_shell_handlers() -> Result<()> {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    // SA_RESTART keeps a pending read or waitpid going after the toggle
    let toggle = SigAction::new(
        SigHandler::Handler(handle_sigtstp),
        SaFlags::SA_RESTART,
        SigSet::all(),
    );

    unsafe {
        signal::sigaction(Signal::SIGINT, &ignore).context(ErrorKind::Nix)?;
        signal::sigaction(Signal::SIGTSTP, &toggle).context(ErrorKind::Nix)?;
    }

    debug!("installed shell signal handlers");
    Ok(())
}

/// Sets the dispositions a freshly forked child needs before exec.
///
/// Runs between fork and exec, so it must stick to async-signal-safe calls.
pub fn reset_for_child(role: ChildRole) -> nix::Result<()> {
    let interrupt = match role {
        ChildRole::Foreground => SigHandler::SigDfl,
        ChildRole::Background => SigHandler::SigIgn,
    };

    unsafe {
        signal::signal(Signal::SIGINT, interrupt)?;
        signal::signal(Signal::SIGTSTP, SigHandler::SigIgn)?;
    }

    Ok(())
}
