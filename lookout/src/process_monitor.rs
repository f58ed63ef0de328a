use crate::Node;
use crate::Pid;

/// A monitor registration held by a monitor service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMonitor {
    /// The node whose bucket this monitor is indexed under.
    pub node: Node,
    /// The monitored process.
    pub target: Pid,
    /// The process to notify when `target` goes down.
    pub watcher: Pid,
}

impl ProcessMonitor {
    /// Constructs a new instance of [ProcessMonitor].
    pub const fn new(node: Node, target: Pid, watcher: Pid) -> Self {
        Self {
            node,
            target,
            watcher,
        }
    }
}
