use bincode::Decode;
use bincode::Encode;

use crate::RemoteRef;

/// The frame used to ask a node to monitor one of its processes on behalf of a remote watcher.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Monitor {
    pub target: RemoteRef,
    pub watcher: RemoteRef,
}

impl Monitor {
    /// Constructs a new instance of [Monitor] frame.
    pub const fn new(target: RemoteRef, watcher: RemoteRef) -> Self {
        Self { target, watcher }
    }
}
