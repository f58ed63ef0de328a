use bincode::Decode;
use bincode::Encode;

use serde::Deserialize;
use serde::Serialize;

use crate::Pid;
use crate::Reference;

/// The wire representation of a [Pid] or [Reference].
///
/// This is the only form in which a node local identifier leaves its node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum RemoteRef {
    /// A process living on `node`.
    Process { node: String, id: u64 },
    /// A monitor token minted by `node`.
    Monitor { node: String, id: u64 },
}

impl RemoteRef {
    /// Returns the name of the node that owns this reference.
    pub fn node(&self) -> &str {
        match self {
            Self::Process { node, .. } => node,
            Self::Monitor { node, .. } => node,
        }
    }
}

impl From<&Pid> for RemoteRef {
    fn from(value: &Pid) -> Self {
        Self::Process {
            node: value.node().name().to_owned(),
            id: value.id(),
        }
    }
}

impl From<&Reference> for RemoteRef {
    fn from(value: &Reference) -> Self {
        Self::Monitor {
            node: value.node().name().to_owned(),
            id: value.id(),
        }
    }
}
