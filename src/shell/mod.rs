//! The dispatcher loop and everything it drives: builtins, the launcher,
//! background job tracking, and signal handling.

pub use self::shell::Shell;

pub mod builtins;
pub mod execute_command;
pub mod job_control;
pub mod redirect;
#[allow(clippy::module_inception)]
pub mod shell;
pub mod signals;

use self::job_control::DEFAULT_JOB_TABLE_CAPACITY;

pub const DEFAULT_PROMPT: &str = ": ";
pub const DEFAULT_MAX_ARGUMENTS: usize = 512;

/// Policy object to control a Shell's behavior
#[derive(Debug, Copy, Clone)]
pub struct ShellConfig {
    /// Text written before each line is read from stdin.
    prompt: &'static str,

    /// Determines if the prompt is displayed at all.
    display_prompt: bool,

    /// Upper bound on the number of arguments a command line may carry.
    max_arguments: usize,

    /// Number of job table slots to start with. The table grows as needed.
    job_table_capacity: usize,

    /// Determines if the shell installs its SIGINT and SIGTSTP handling.
    handle_signals: bool,
}

impl ShellConfig {
    /// Creates an interactive shell
    ///
    /// # Complete List
    /// - The prompt is displayed before each line
    /// - SIGINT is ignored and SIGTSTP toggles foreground-only mode
    pub fn interactive() -> Self {
        Self {
            display_prompt: true,
            handle_signals: true,
            ..Default::default()
        }
    }

    /// Creates a shell that runs a command string or a script
    ///
    /// # Complete List
    /// - No prompt is displayed
    /// - Signal handling is the same as for an interactive shell
    pub fn noninteractive() -> Self {
        Self {
            handle_signals: true,
            ..Default::default()
        }
    }

    pub fn with_max_arguments(self, max_arguments: usize) -> Self {
        Self {
            max_arguments,
            ..self
        }
    }

    pub fn with_job_table_capacity(self, job_table_capacity: usize) -> Self {
        Self {
            job_table_capacity,
            ..self
        }
    }

    pub fn prompt(&self) -> &'static str {
        self.prompt
    }

    pub fn max_arguments(&self) -> usize {
        self.max_arguments
    }
}

/// No prompt and no signal handlers; the remaining limits take their usual
/// values.
impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT,
            display_prompt: false,
            max_arguments: DEFAULT_MAX_ARGUMENTS,
            job_table_capacity: DEFAULT_JOB_TABLE_CAPACITY,
            handle_signals: false,
        }
    }
}
