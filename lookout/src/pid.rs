use std::fmt::Debug;

use serde::Deserialize;
use serde::Serialize;

use crate::Node;
use crate::RemoteRef;

/// A unique identifier of a process in the cluster.
///
/// The id part is only meaningful on the node that owns the process.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pid {
    node: Node,
    id: u64,
}

impl Pid {
    /// Constructs a new [Pid] from the given node and process id.
    pub(crate) const fn new(node: Node, id: u64) -> Self {
        Self { node, id }
    }

    /// Returns the node this process lives on.
    pub const fn node(&self) -> &Node {
        &self.node
    }

    /// Returns `true` if this [Pid] lives on the same node as the current process.
    pub fn is_local(&self) -> bool {
        self.node.is_local()
    }

    /// Returns `true` if this [Pid] lives on a different node than the current process.
    pub fn is_remote(&self) -> bool {
        !self.is_local()
    }

    /// Fetches the node local process id of the [Pid].
    pub(crate) const fn id(&self) -> u64 {
        self.id
    }
}

impl Debug for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pid<{}, {}>", self.node.name(), self.id)
    }
}

impl TryFrom<RemoteRef> for Pid {
    type Error = RemoteRef;

    fn try_from(value: RemoteRef) -> Result<Self, Self::Error> {
        match value {
            RemoteRef::Process { node, id } if id != 0 => Ok(Pid::new(Node::new(node), id)),
            value => Err(value),
        }
    }
}

impl Serialize for Pid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        RemoteRef::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Pid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let remote = RemoteRef::deserialize(deserializer)?;

        Pid::try_from(remote)
            .map_err(|remote| serde::de::Error::custom(format!("Expected a process: {:?}", remote)))
    }
}
