use std::sync::Arc;

use tokio::sync::oneshot;

use crate::frame::Demonitor;
use crate::frame::DemonitorReply;
use crate::frame::Frame;
use crate::frame::Monitor;
use crate::frame::MonitorReply;
use crate::frame::ProcessDown;

use crate::ExitReason;
use crate::Message;
use crate::Node;
use crate::NodeRuntime;
use crate::Pid;
use crate::Process;
use crate::ProcessItem;
use crate::Reference;
use crate::Registry;
use crate::SystemMessage;
use crate::PROCESS;

/// A message handled by a node's monitor service.
pub(crate) enum ServiceMessage {
    /// A frame from another node, with a reply channel when it was sent as a call.
    Frame(Frame, Option<oneshot::Sender<Frame>>),
    /// A node left the cluster view.
    NodeDown(Node),
    /// A local process wants to watch a node.
    MonitorNode(Pid, Node, oneshot::Sender<()>),
    /// A local process stops watching a node once.
    DemonitorNode(Pid, Node, oneshot::Sender<bool>),
    /// A local watcher obtained a monitor on a remote target.
    Track(Reference, Pid, Pid),
    /// A local watcher no longer holds a remote monitor.
    Untrack(Reference),
    /// A local watcher exited while holding a remote monitor.
    Release(Reference, Pid),
    /// Requests a snapshot of the registry.
    Registry(oneshot::Sender<Registry>),
}

/// The monitor service state, owned by the service process.
struct MonitorService {
    runtime: Arc<NodeRuntime>,
    registry: Registry,
}

/// The monitor service process, every mutation of the [Registry] happens here.
pub(crate) async fn monitor_service() {
    let mut service = MonitorService {
        runtime: PROCESS.with(|process| process.runtime.clone()),
        registry: Registry::new(),
    };

    loop {
        match Process::receive::<ServiceMessage>().await {
            Message::User(message) => service.handle(message),
            Message::System(SystemMessage::ProcessDown(process, reference, exit_reason)) => {
                service.process_down(process, reference, exit_reason);
            }
            Message::System(SystemMessage::NodeDown(_)) => {
                // The service never watches nodes, down events come in through its subscription.
            }
        }
    }
}

impl MonitorService {
    fn node(&self) -> &Node {
        self.runtime.node()
    }

    fn handle(&mut self, message: ServiceMessage) {
        match message {
            ServiceMessage::Frame(frame, reply) => self.frame(frame, reply),
            ServiceMessage::NodeDown(node) => self.node_down(node),
            ServiceMessage::MonitorNode(pid, node, reply) => self.monitor_node(pid, node, reply),
            ServiceMessage::DemonitorNode(pid, node, reply) => {
                let _ = reply.send(self.registry.remove_node_watch(&node, &pid));
            }
            ServiceMessage::Track(reference, watcher, target) => {
                self.track(reference, watcher, target)
            }
            ServiceMessage::Untrack(reference) => {
                self.registry.remove_remote_monitor(&reference);
            }
            ServiceMessage::Release(reference, target) => self.release(reference, target),
            ServiceMessage::Registry(reply) => {
                let _ = reply.send(self.registry.clone());
            }
        }
    }

    fn frame(&mut self, frame: Frame, reply: Option<oneshot::Sender<Frame>>) {
        match frame {
            Frame::Monitor(request) => self.monitor(request, reply),
            Frame::Demonitor(request) => self.demonitor(request, reply),
            Frame::ProcessDown(down) => self.remote_process_down(down),
            #[allow(unused_variables)]
            frame => {
                #[cfg(feature = "tracing")]
                tracing::warn!(node = ?self.node(), kind = frame.kind(), "Unexpected reply frame");
            }
        }
    }

    /// Installs a monitor on a local process on behalf of a remote watcher.
    fn monitor(&mut self, request: Monitor, reply: Option<oneshot::Sender<Frame>>) {
        let Some(reply) = reply else {
            #[cfg(feature = "tracing")]
            tracing::warn!(node = ?self.node(), "Monitor request without a reply channel");

            return;
        };

        let (Ok(target), Ok(watcher)) = (
            Pid::try_from(request.target),
            Pid::try_from(request.watcher),
        ) else {
            #[cfg(feature = "tracing")]
            tracing::warn!(node = ?self.node(), "Malformed monitor request");

            return;
        };

        if target.node() != self.node() {
            #[cfg(feature = "tracing")]
            tracing::warn!(node = ?self.node(), target_process = ?target, "Monitor request for a process on another node");

            return;
        }

        // The sweep for the watcher's node may already have happened.
        if !self.runtime.transport.is_member(watcher.node()) {
            #[cfg(feature = "tracing")]
            tracing::debug!(node = ?self.node(), watcher = ?watcher, "Monitor request from a node that is down");

            return;
        }

        let reference = self.runtime.monitor_install(&target);

        #[cfg(feature = "tracing")]
        tracing::debug!(target_process = ?target, watcher = ?watcher, reference = ?reference, "Monitor registered");

        self.registry.add_process_monitor(
            watcher.node().clone(),
            reference.clone(),
            watcher,
            target,
        );

        // The caller gave up waiting, nobody will ever hold the token.
        if reply
            .send(MonitorReply::new((&reference).into()).into())
            .is_err()
        {
            #[cfg(feature = "tracing")]
            tracing::debug!(reference = ?reference, "Monitor reply was not received, rolling back");

            self.registry.remove_process_monitor(&reference);
            self.runtime.monitor_cancel(&reference);
        }
    }

    /// Cancels a monitor held by a remote watcher.
    fn demonitor(&mut self, request: Demonitor, reply: Option<oneshot::Sender<Frame>>) {
        let Ok(reference) = Reference::try_from(request.reference) else {
            #[cfg(feature = "tracing")]
            tracing::warn!(node = ?self.node(), "Malformed demonitor request");

            return;
        };

        let found = self.registry.remove_process_monitor(&reference).is_some();

        if found {
            self.runtime.monitor_cancel(&reference);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(reference = ?reference, found, "Monitor cancelled");

        if let Some(reply) = reply {
            let _ = reply.send(DemonitorReply::new(found).into());
        }
    }

    /// Hands a termination notification from another node to the local watcher.
    fn remote_process_down(&mut self, down: ProcessDown) {
        let (Ok(reference), Ok(process), Ok(watcher)) = (
            Reference::try_from(down.reference),
            Pid::try_from(down.process),
            Pid::try_from(down.watcher),
        ) else {
            #[cfg(feature = "tracing")]
            tracing::warn!(node = ?self.node(), "Malformed process down frame");

            return;
        };

        if watcher.node() != self.node() {
            #[cfg(feature = "tracing")]
            tracing::warn!(node = ?self.node(), watcher = ?watcher, "Process down frame for a watcher on another node");

            return;
        }

        self.registry.remove_remote_monitor(&reference);

        self.runtime.deliver(
            &watcher,
            ProcessItem::MonitorProcessDown(process, reference, down.exit_reason),
        );
    }

    /// A native monitor held for a remote watcher fired.
    fn process_down(&mut self, process: Pid, reference: Reference, exit_reason: ExitReason) {
        let Some((_, watcher)) = self.registry.remove_process_monitor(&reference) else {
            return;
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(target_process = ?process, watcher = ?watcher, reference = ?reference, exit_reason = ?exit_reason, "Forwarding process down");

        let down = ProcessDown::new(
            (&reference).into(),
            (&process).into(),
            (&watcher).into(),
            exit_reason,
        );

        self.runtime.transport.forward(watcher.node(), down.into());
    }

    fn node_down(&mut self, node: Node) {
        if &node == self.node() {
            return;
        }

        let watchers = self.registry.drain_watchers(&node);
        let monitors = self.registry.drain_by_node(&node);
        let remote_monitors = self.registry.drain_remote_by_node(&node);

        #[cfg(feature = "tracing")]
        tracing::info!(
            node = ?self.node(),
            down = ?node,
            watchers = watchers.len(),
            monitors = monitors.len(),
            remote_monitors = remote_monitors.len(),
            "Node went down"
        );

        for watcher in watchers {
            self.runtime.deliver(
                &watcher,
                SystemMessage::NodeDown(node.clone()).into(),
            );
        }

        for reference in monitors {
            self.runtime.monitor_cancel(&reference);
        }

        if !self.runtime.options.noconnection_downs {
            return;
        }

        for (reference, target, watcher) in remote_monitors {
            self.runtime.deliver(
                &watcher,
                ProcessItem::MonitorProcessDown(target, reference, ExitReason::noconnection()),
            );
        }
    }

    fn monitor_node(&mut self, pid: Pid, node: Node, reply: oneshot::Sender<()>) {
        if &node == self.node() {
            let _ = reply.send(());
            return;
        }

        if self.runtime.transport.is_member(&node) {
            self.registry.add_node_watch(node, pid);

            let _ = reply.send(());
            return;
        }

        let _ = reply.send(());

        self.runtime
            .deliver(&pid, SystemMessage::NodeDown(node).into());
    }

    fn track(&mut self, reference: Reference, watcher: Pid, target: Pid) {
        if self.runtime.transport.is_member(target.node()) {
            self.registry.add_remote_monitor(
                target.node().clone(),
                reference,
                watcher,
                target,
            );
            return;
        }

        // The node went down between the monitor reply and now.
        if self.runtime.options.noconnection_downs {
            self.runtime.deliver(
                &watcher,
                ProcessItem::MonitorProcessDown(target, reference, ExitReason::noconnection()),
            );
        }
    }

    fn release(&mut self, reference: Reference, target: Pid) {
        self.registry.remove_remote_monitor(&reference);

        #[cfg(feature = "tracing")]
        tracing::debug!(target_process = ?target, reference = ?reference, "Releasing monitor of an exited watcher");

        self.runtime
            .transport
            .forward(target.node(), Demonitor::new((&reference).into()).into());
    }
}
