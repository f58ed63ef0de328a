use bincode::Decode;
use bincode::Encode;

/// The reply to a [Demonitor](super::Demonitor) frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct DemonitorReply {
    /// Whether or not the monitor was still active.
    pub found: bool,
}

impl DemonitorReply {
    /// Constructs a new instance of [DemonitorReply] frame.
    pub const fn new(found: bool) -> Self {
        Self { found }
    }
}
