use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;

use tokio::task::AbortHandle;

use crate::ExitReason;
use crate::ProcessRegistration;
use crate::ProcessSend;

/// The processes running on a single node, keyed by node local process id.
pub struct ProcessRegistry {
    processes: DashMap<u64, ProcessRegistration>,
    next_id: AtomicU64,
}

impl ProcessRegistry {
    /// Constructs a new empty [ProcessRegistry].
    pub fn new() -> Self {
        Self {
            processes: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Inserts a new process registration, returning the id assigned to it.
    pub fn insert(&self, registration: ProcessRegistration) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.processes.insert(id, registration);

        id
    }

    /// Stores the abort handle of a freshly spawned process.
    ///
    /// A process that was told to exit before its task was spawned is aborted right away.
    pub fn set_abort(&self, id: u64, abort: AbortHandle) {
        let exiting = match self.processes.get_mut(&id) {
            Some(mut process) => {
                process.abort = Some(abort.clone());
                process.exit_reason.is_some()
            }
            None => false,
        };

        if exiting {
            abort.abort();
        }
    }

    /// Drops a process from the registry.
    pub fn remove(&self, id: u64) -> Option<ProcessRegistration> {
        self.processes.remove(&id).map(|(_, process)| process)
    }

    /// Gets the sender for this process.
    pub fn sender(&self, id: u64) -> Option<ProcessSend> {
        self.processes.get(&id).map(|process| process.sender.clone())
    }

    /// Checks if the process is alive.
    pub fn alive(&self, id: u64) -> bool {
        self.processes
            .get(&id)
            .map(|process| process.exit_reason.is_none())
            .unwrap_or_default()
    }

    /// Sets the process exit reason, keeping the first one recorded.
    pub fn set_exit_reason(&self, id: u64, exit_reason: ExitReason) {
        if let Some(mut process) = self.processes.get_mut(&id) {
            process.exit_reason.get_or_insert(exit_reason);
        }
    }

    /// Terminates the process with the given `exit_reason`, returns `false` if it wasn't found.
    pub fn exit(&self, id: u64, exit_reason: ExitReason) -> bool {
        let abort = {
            let Some(mut process) = self.processes.get_mut(&id) else {
                return false;
            };

            process.exit_reason.get_or_insert(exit_reason);
            process.abort.clone()
        };

        if let Some(abort) = abort {
            abort.abort();
        }

        true
    }

    /// Returns the number of processes currently registered.
    pub fn len(&self) -> usize {
        self.processes.len()
    }
}

impl Default for ProcessRegistry {
    fn default() -> Self {
        Self::new()
    }
}
