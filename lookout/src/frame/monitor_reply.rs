use bincode::Decode;
use bincode::Encode;

use crate::RemoteRef;

/// The reply to a [Monitor](super::Monitor) frame, carrying the minted monitor token.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct MonitorReply {
    pub reference: RemoteRef,
}

impl MonitorReply {
    /// Constructs a new instance of [MonitorReply] frame.
    pub const fn new(reference: RemoteRef) -> Self {
        Self { reference }
    }
}
