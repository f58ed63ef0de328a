use tokio::task::AbortHandle;

use crate::ExitReason;
use crate::ProcessSend;

/// Process registration information.
pub struct ProcessRegistration {
    /// A handle used to abort the task this process lives in, set once the task is spawned.
    pub abort: Option<AbortHandle>,
    /// The sender of this process.
    pub sender: ProcessSend,
    /// Process exit reason, [None] while the process is running normally.
    pub exit_reason: Option<ExitReason>,
}

impl ProcessRegistration {
    /// Constructs a new [ProcessRegistration] from a given mailbox sender.
    pub const fn new(sender: ProcessSend) -> Self {
        Self {
            abort: None,
            sender,
            exit_reason: None,
        }
    }
}
