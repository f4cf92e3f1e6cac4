//! Tracking of background children.

use std::fmt;

use log::{debug, warn};
use nix::{
    errno::Errno,
    sys::signal::{self, Signal},
    unistd::Pid,
};

use crate::core::job::{ExitOutcome, ProcessId};
use crate::shell::execute_command;

pub const DEFAULT_JOB_TABLE_CAPACITY: usize = 8;

/// Registry of background children that have not been reaped yet.
///
/// Slots are `None` when free. The table doubles when every slot is taken
/// and never shrinks.
pub struct JobTable {
    slots: Vec<Option<ProcessId>>,
}

impl JobTable {
    pub fn with_capacity(capacity: usize) -> Self {
        JobTable {
            slots: vec![None; capacity.max(1)],
        }
    }

    /// Tracks `id`. Registering an id that is already tracked does nothing.
    pub fn register(&mut self, id: ProcessId) {
        if self.contains(id) {
            warn!("{} is already tracked", id);
            return;
        }

        match self.slots.iter().position(Option::is_none) {
            Some(index) => self.slots[index] = Some(id),
            None => {
                let index = self.slots.len();
                self.slots.resize(index * 2, None);
                debug!("job table grew to {} slots", self.slots.len());
                self.slots[index] = Some(id);
            }
        }
    }

    /// Stops tracking `id`. Returns `false` if it was not tracked.
    pub fn unregister(&mut self, id: ProcessId) -> bool {
        match self.slots.iter().position(|slot| *slot == Some(id)) {
            Some(index) => {
                self.slots[index] = None;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: ProcessId) -> bool {
        self.slots.iter().any(|slot| *slot == Some(id))
    }

    /// Tracked ids in slot order.
    pub fn live(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }

    pub fn len(&self) -> usize {
        self.live().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Polls every tracked child without blocking and removes the ones that
    /// have terminated, returning them in slot order.
    pub fn reap_all_nonblocking(&mut self) -> Vec<(ProcessId, ExitOutcome)> {
        let mut reaped = Vec::new();
        for slot in &mut self.slots {
            let id = match *slot {
                Some(id) => id,
                None => continue,
            };

            match execute_command::try_wait_for_process(id) {
                Ok(Some(outcome)) => {
                    debug!("reaped {} with {}", id, outcome);
                    *slot = None;
                    reaped.push((id, outcome));
                }
                Ok(None) => (),
                Err(e) => {
                    // Someone else already collected it; there is nothing
                    // left to report.
                    warn!("dropping {} from job table: {}", id, e);
                    *slot = None;
                }
            }
        }

        reaped
    }

    /// Sends SIGKILL to every tracked child and empties the table. Does not
    /// wait for the children to die.
    pub fn terminate_all(&mut self) {
        for slot in &mut self.slots {
            if let Some(id) = slot.take() {
                debug!("killing background process {}", id);
                match signal::kill(Pid::from(id), Signal::SIGKILL) {
                    Ok(()) | Err(Errno::ESRCH) => (),
                    Err(e) => warn!("failed to kill {}: {}", id, e),
                }
            }
        }
    }
}

impl Default for JobTable {
    fn default() -> Self {
        JobTable::with_capacity(DEFAULT_JOB_TABLE_CAPACITY)
    }
}

impl fmt::Debug for JobTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} jobs\tcapacity: {}", self.len(), self.capacity())?;
        for id in self.live() {
            write!(f, "\n{}", id)?;
        }

        Ok(())
    }
}
