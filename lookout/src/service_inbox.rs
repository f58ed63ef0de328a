use tokio::sync::oneshot;

use crate::frame::Frame;

use crate::Node;
use crate::Pid;
use crate::ProcessItem;
use crate::ProcessSend;
use crate::ServiceMessage;

/// The mailbox of a node's monitor service, handed to transports so inbound traffic
/// and node down events are processed in arrival order with local requests.
#[derive(Clone)]
pub struct ServiceInbox {
    pid: Pid,
    sender: ProcessSend,
}

impl ServiceInbox {
    /// Constructs a new [ServiceInbox] for the given service process.
    pub(crate) const fn new(pid: Pid, sender: ProcessSend) -> Self {
        Self { pid, sender }
    }

    /// Returns the [Pid] of the monitor service.
    pub const fn pid(&self) -> &Pid {
        &self.pid
    }

    /// Returns the node the monitor service runs on.
    pub const fn node(&self) -> &Node {
        self.pid.node()
    }

    /// Queues a node down event, returns `false` if the service is gone.
    pub fn node_down(&self, node: Node) -> bool {
        self.send(ServiceMessage::NodeDown(node))
    }

    /// Queues a one-way frame, returns `false` if the service is gone.
    pub fn deliver(&self, frame: Frame) -> bool {
        self.send(ServiceMessage::Frame(frame, None))
    }

    /// Queues a request frame, the returned receiver resolves with the reply.
    ///
    /// The receiver errors if the service is gone or rejects the request.
    pub fn request(&self, frame: Frame) -> oneshot::Receiver<Frame> {
        let (tx, rx) = oneshot::channel();

        self.send(ServiceMessage::Frame(frame, Some(tx)));

        rx
    }

    /// Queues a message for the monitor service.
    pub(crate) fn send(&self, message: ServiceMessage) -> bool {
        self.sender
            .send(ProcessItem::UserLocalMessage(Box::new(message)))
            .is_ok()
    }
}
