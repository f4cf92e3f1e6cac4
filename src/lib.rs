//! Smallsh - a small interactive shell
//!
//! Reads one line at a time, expands `$$` to the shell's pid, and either runs
//! a builtin (`exit`, `cd`, `status`) or launches the named program with
//! optional redirection and background execution.

#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]

/// Logs the error of a best-effort operation instead of propagating it.
macro_rules! log_if_err {
    ($result:expr, $msg:expr) => {{
        if let Err(ref e) = $result {
            ::log::error!("{}: {}", $msg, e);
        }
    }};
    ($result:expr, $fmt:expr, $($arg:tt)+) => {{
        if let Err(ref e) = $result {
            ::log::error!("{}: {}", format!($fmt, $($arg)+), e);
        }
    }};
}

pub mod core;
pub mod errors;
pub mod shell;

pub use crate::core::job::{ExitOutcome, ProcessId};
pub use crate::errors::{Error, ErrorKind, Result};
pub use crate::shell::{Shell, ShellConfig};
