use std::fmt::Debug;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::PROCESS;

/// The cluster-unique name of a node.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Node {
    name: Arc<str>,
}

impl Node {
    /// Constructs a new [Node] with the given name.
    pub fn new<T: AsRef<str>>(name: T) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
        }
    }

    /// Returns the [Node] the current process is running on.
    #[must_use]
    pub fn current() -> Node {
        PROCESS.with(|process| process.runtime.node().clone())
    }

    /// Returns the name of this [Node].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if this is the node the current process is running on.
    pub fn is_local(&self) -> bool {
        PROCESS
            .try_with(|process| process.runtime.node() == self)
            .unwrap_or_default()
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&Node> for Node {
    fn from(value: &Node) -> Self {
        value.clone()
    }
}

impl PartialEq<&str> for Node {
    fn eq(&self, other: &&str) -> bool {
        &*self.name == *other
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node<{}>", self.name)
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.name)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;

        Ok(Self::new(name))
    }
}
