//! Standard stream rewiring for children.
//!
//! Files are opened in the shell before the child is created, so a bad path
//! only aborts the pending command.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::process::Stdio;

use log::debug;

use crate::core::parser::Redirects;
use crate::errors::{Error, Result};

const OUTPUT_FILE_MODE: u32 = 0o644;

#[derive(Debug)]
pub enum Stdin {
    Inherit,
    Null,
    File(File),
}

#[derive(Debug)]
pub enum Output {
    Inherit,
    Null,
    File(File),
}

impl Stdin {
    /// Background commands without an input file read from /dev/null.
    fn new(path: Option<&str>, background: bool) -> Result<Self> {
        match path {
            Some(path) => File::open(path)
                .map(Stdin::File)
                .map_err(|e| {
                    debug!("failed to open {} for input: {}", path, e);
                    Error::redirect(format!("cannot open {} for input", path))
                }),
            None if background => Ok(Stdin::Null),
            None => Ok(Stdin::Inherit),
        }
    }
}

impl Output {
    /// Background commands without an output file write to /dev/null.
    fn new(path: Option<&str>, background: bool) -> Result<Self> {
        match path {
            Some(path) => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(OUTPUT_FILE_MODE)
                .open(path)
                .map(Output::File)
                .map_err(|e| {
                    debug!("failed to open {} for output: {}", path, e);
                    Error::redirect(format!("cannot open {} for output", path))
                }),
            None if background => Ok(Output::Null),
            None => Ok(Output::Inherit),
        }
    }
}

impl From<Stdin> for Stdio {
    fn from(stdin: Stdin) -> Self {
        match stdin {
            Stdin::Inherit => Self::inherit(),
            Stdin::Null => Self::null(),
            Stdin::File(file) => file.into(),
        }
    }
}

impl From<Output> for Stdio {
    fn from(stdout: Output) -> Self {
        match stdout {
            Output::Inherit => Self::inherit(),
            Output::Null => Self::null(),
            Output::File(file) => file.into(),
        }
    }
}

/// Opened streams for one child.
#[derive(Debug)]
pub struct Redirection {
    pub stdin: Stdin,
    pub stdout: Output,
}

impl Redirection {
    /// Opens the input file, then the output file. `background` is whether
    /// the command will actually run in the background.
    pub fn open(redirects: &Redirects, background: bool) -> Result<Self> {
        let stdin = Stdin::new(redirects.input.as_ref().map(String::as_str), background)?;
        let stdout = Output::new(redirects.output.as_ref().map(String::as_str), background)?;
        Ok(Redirection { stdin, stdout })
    }
}
