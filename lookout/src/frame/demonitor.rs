use bincode::Decode;
use bincode::Encode;

use crate::RemoteRef;

/// The frame used to cancel a monitor held by a remote watcher.
///
/// Sent as a call when a watcher demonitors, and forwarded one-way when a watcher exits.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Demonitor {
    pub reference: RemoteRef,
}

impl Demonitor {
    /// Constructs a new instance of [Demonitor] frame.
    pub const fn new(reference: RemoteRef) -> Self {
        Self { reference }
    }
}
