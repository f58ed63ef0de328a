use std::fmt::Display;

use crate::Node;

/// Occurs when a cross-node monitor request could not be delivered or answered.
///
/// The request may or may not have been handled by the remote node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// The node is not reachable, or its monitor service is gone.
    NoConnection(Node),
    /// The node did not reply within the configured call timeout.
    Timeout(Node),
    /// The node replied with a frame that doesn't answer the request.
    BadReply(Node),
}

impl MonitorError {
    /// Returns the node the failed request was addressed to.
    pub const fn node(&self) -> &Node {
        match self {
            Self::NoConnection(node) => node,
            Self::Timeout(node) => node,
            Self::BadReply(node) => node,
        }
    }
}

impl Display for MonitorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoConnection(node) => write!(f, "no connection to {:?}", node),
            Self::Timeout(node) => write!(f, "timed out waiting for {:?}", node),
            Self::BadReply(node) => write!(f, "unexpected reply from {:?}", node),
        }
    }
}

impl std::error::Error for MonitorError {}
