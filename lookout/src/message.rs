use crate::ExitReason;
use crate::Node;
use crate::Pid;
use crate::Reference;

/// A message received by a process.
#[derive(Debug)]
pub enum Message<T> {
    /// A message that was sent from another process.
    User(T),
    /// A notification that was sent from the runtime.
    System(SystemMessage),
}

/// A notification delivered by the runtime or a monitor service.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemMessage {
    /// A monitored process went down, identified by the monitor's [Reference].
    ProcessDown(Pid, Reference, ExitReason),
    /// A watched node went down or was never reachable.
    NodeDown(Node),
}
