use bincode::Decode;
use bincode::Encode;

use crate::ExitReason;
use crate::RemoteRef;

/// The frame used to notify a remote watcher that a monitored process went down.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ProcessDown {
    pub reference: RemoteRef,
    pub process: RemoteRef,
    pub watcher: RemoteRef,
    pub exit_reason: ExitReason,
}

impl ProcessDown {
    /// Constructs a new instance of [ProcessDown] frame.
    pub const fn new(
        reference: RemoteRef,
        process: RemoteRef,
        watcher: RemoteRef,
        exit_reason: ExitReason,
    ) -> Self {
        Self {
            reference,
            process,
            watcher,
            exit_reason,
        }
    }
}
