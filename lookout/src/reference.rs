use std::fmt::Debug;
use std::num::NonZeroU64;

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde::Serialize;

use crate::Node;
use crate::RemoteRef;

/// A unique id minted by a specific node, used as a monitor token.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reference {
    node: Node,
    id: NonZeroU64,
}

impl Reference {
    /// Constructs a new unique [Reference] owned by the given node.
    pub(crate) fn new(node: Node) -> Self {
        static REF: AtomicU64 = AtomicU64::new(1);

        // Zero is reserved, skip it if the counter ever wraps.
        loop {
            if let Some(id) = NonZeroU64::new(REF.fetch_add(1, Ordering::Relaxed)) {
                return Self { node, id };
            }
        }
    }

    /// Returns the node that minted this [Reference].
    pub const fn node(&self) -> &Node {
        &self.node
    }

    /// Returns `true` if this [Reference] was minted by the current process's node.
    pub fn is_local(&self) -> bool {
        self.node.is_local()
    }

    /// Returns `true` if this [Reference] was minted by a different node.
    pub fn is_remote(&self) -> bool {
        !self.is_local()
    }

    /// Gets the id part of this [Reference].
    pub(crate) const fn id(&self) -> u64 {
        self.id.get()
    }
}

impl Debug for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Reference<{}, {}>", self.node.name(), self.id)
    }
}

impl TryFrom<RemoteRef> for Reference {
    type Error = RemoteRef;

    fn try_from(value: RemoteRef) -> Result<Self, Self::Error> {
        match value {
            RemoteRef::Monitor { node, id } => match NonZeroU64::new(id) {
                Some(id) => Ok(Reference {
                    node: Node::new(node),
                    id,
                }),
                None => Err(RemoteRef::Monitor { node, id }),
            },
            value => Err(value),
        }
    }
}

impl Serialize for Reference {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        RemoteRef::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let remote = RemoteRef::deserialize(deserializer)?;

        Reference::try_from(remote).map_err(|remote| {
            serde::de::Error::custom(format!("Expected a monitor reference: {:?}", remote))
        })
    }
}
