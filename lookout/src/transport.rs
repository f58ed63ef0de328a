use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::frame::Frame;

use crate::MonitorError;
use crate::Node;
use crate::NodePattern;
use crate::ServiceInbox;

/// The cluster plumbing a monitor service relies on.
///
/// A transport is bound to one local node. Frames are addressed to the monitor service
/// of the destination node, which is reached through the [ServiceInbox] registered for it.
pub trait Transport: Send + Sync + 'static {
    /// Sends a frame to the monitor service on `node` without waiting for an answer.
    ///
    /// Delivery is best effort, the frame is dropped when `node` is unreachable.
    fn forward(&self, node: &Node, frame: Frame);

    /// Sends a request frame to the monitor service on `node` and waits for its reply.
    ///
    /// Fails with a [MonitorError] when the node is unreachable or doesn't reply within `timeout`.
    fn call(
        &self,
        node: &Node,
        frame: Frame,
        timeout: Duration,
    ) -> BoxFuture<'static, Result<Frame, MonitorError>>;

    /// Pushes one node down event into `inbox` per observed down transition of a node matching `pattern`.
    fn subscribe_node_down(&self, pattern: NodePattern, inbox: ServiceInbox);

    /// Returns `true` if `node` is in the current cluster view.
    fn is_member(&self, node: &Node) -> bool;
}
