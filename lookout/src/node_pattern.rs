use crate::Node;

/// Selects which nodes a node down subscription is interested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePattern {
    /// Every node.
    Any,
    /// A single node.
    Exact(Node),
}

impl NodePattern {
    /// Returns `true` if the given node matches this pattern.
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(exact) => exact == node,
        }
    }
}

impl From<Node> for NodePattern {
    fn from(value: Node) -> Self {
        Self::Exact(value)
    }
}
