use std::future::Future;
use std::sync::Arc;
use std::sync::OnceLock;

use tokio::sync::oneshot;

use crate::monitor_service;
use crate::spawn_internal;
use crate::ExitReason;
use crate::MonitorTable;
use crate::Node;
use crate::NodeOptions;
use crate::NodePattern;
use crate::Pid;
use crate::ProcessItem;
use crate::ProcessRegistry;
use crate::Registry;
use crate::ServiceInbox;
use crate::ServiceMessage;
use crate::Transport;

/// The state shared by every process running on a node.
pub(crate) struct NodeRuntime {
    node: Node,
    pub(crate) options: NodeOptions,
    pub(crate) processes: ProcessRegistry,
    pub(crate) monitors: MonitorTable,
    pub(crate) transport: Arc<dyn Transport>,
    service: OnceLock<ServiceInbox>,
}

impl NodeRuntime {
    /// Constructs a new [NodeRuntime] without a monitor service.
    fn new(node: Node, options: NodeOptions, transport: Arc<dyn Transport>) -> Self {
        Self {
            node,
            options,
            processes: ProcessRegistry::new(),
            monitors: MonitorTable::default(),
            transport,
            service: OnceLock::new(),
        }
    }

    /// Returns the node this runtime belongs to.
    pub(crate) const fn node(&self) -> &Node {
        &self.node
    }

    /// Returns the monitor service inbox, [None] while the node is starting.
    pub(crate) fn service(&self) -> Option<&ServiceInbox> {
        self.service.get()
    }

    /// Pushes an item into the mailbox of a local process, returns `false` if it is gone.
    pub(crate) fn deliver(&self, pid: &Pid, item: ProcessItem) -> bool {
        if pid.node() != &self.node {
            return false;
        }

        let Some(sender) = self.processes.sender(pid.id()) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(process = ?pid, item = ?item, "Dropped delivery to a dead process");

            return false;
        };

        sender.send(item).is_ok()
    }
}

/// A handle to a running node.
///
/// Starting a node spawns its monitor service and subscribes it to node down events.
#[derive(Clone)]
pub struct LocalNode {
    runtime: Arc<NodeRuntime>,
    inbox: ServiceInbox,
}

impl LocalNode {
    /// Starts a node with the given name on the current tokio runtime.
    pub fn start<N: Into<Node>>(
        node: N,
        options: NodeOptions,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let runtime = Arc::new(NodeRuntime::new(node.into(), options, transport));

        let (pid, sender) = spawn_internal(runtime.clone(), monitor_service());
        let inbox = ServiceInbox::new(pid, sender);

        // Subscribe before anything can observe the node, so no down event is missed.
        runtime
            .transport
            .subscribe_node_down(NodePattern::Any, inbox.clone());

        let _ = runtime.service.set(inbox.clone());

        #[cfg(feature = "tracing")]
        tracing::info!(node = ?runtime.node(), service = ?inbox.pid(), "Node has started");

        Self { runtime, inbox }
    }

    /// Returns the name of this node.
    pub fn node(&self) -> &Node {
        self.runtime.node()
    }

    /// Returns the options this node was started with.
    pub fn options(&self) -> NodeOptions {
        self.runtime.options
    }

    /// Returns the inbox of this node's monitor service.
    pub fn inbox(&self) -> &ServiceInbox {
        &self.inbox
    }

    /// Spawns the given `function` as a process on this node and returns its [Pid].
    pub fn spawn<T>(&self, function: T) -> Pid
    where
        T: Future<Output = ()> + Send + 'static,
    {
        spawn_internal(self.runtime.clone(), function).0
    }

    /// Terminates a process on this node, returns `false` if it wasn't found.
    pub fn exit<E: Into<ExitReason>>(&self, pid: &Pid, exit_reason: E) -> bool {
        pid.node() == self.node() && self.runtime.processes.exit(pid.id(), exit_reason.into())
    }

    /// Returns `true` if the given process is alive on this node.
    pub fn alive(&self, pid: &Pid) -> bool {
        pid.node() == self.node() && self.runtime.processes.alive(pid.id())
    }

    /// Returns the number of processes on this node, the monitor service included.
    pub fn processes(&self) -> usize {
        self.runtime.processes.len()
    }

    /// Returns the number of local processes with at least one native monitor on them.
    pub fn monitored_processes(&self) -> usize {
        self.runtime.monitors.len()
    }

    /// Returns a snapshot of the monitor service's [Registry].
    ///
    /// The snapshot is taken in order with every message queued before it,
    /// [None] if the monitor service is gone.
    pub async fn registry(&self) -> Option<Registry> {
        let (tx, rx) = oneshot::channel();

        if !self.inbox.send(ServiceMessage::Registry(tx)) {
            return None;
        }

        rx.await.ok()
    }
}
