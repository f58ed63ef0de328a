use std::cell::RefCell;
use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::frame::Demonitor;
use crate::frame::Frame;
use crate::frame::Monitor;

use crate::AsyncCatchUnwind;
use crate::DemonitorOptions;
use crate::ExitReason;
use crate::Message;
use crate::MonitorError;
use crate::Node;
use crate::NodeRuntime;
use crate::Pid;
use crate::ProcessItem;
use crate::ProcessReceive;
use crate::ProcessRegistration;
use crate::ProcessSend;
use crate::Reference;
use crate::ServiceMessage;
use crate::SystemMessage;
use crate::Timeout;

/// A light weight task that can send and receive messages.
pub struct Process {
    /// The unique id of this process.
    pub(crate) pid: Pid,
    /// The inbox for this process.
    pub(crate) channel: ProcessReceive,
    /// The node this process runs on.
    pub(crate) runtime: Arc<NodeRuntime>,
    /// The monitors this process holds, mapped to their target.
    pub(crate) monitors: RefCell<BTreeMap<Reference, Pid>>,
}

tokio::task_local! {
    /// Current process information.
    pub(crate) static PROCESS: Process;
}

impl Process {
    /// Constructs a new [Process] from the given [Pid] and channel.
    pub(crate) const fn new(pid: Pid, channel: ProcessReceive, runtime: Arc<NodeRuntime>) -> Self {
        Self {
            pid,
            channel,
            runtime,
            monitors: RefCell::new(BTreeMap::new()),
        }
    }

    /// Returns the current [Pid].
    #[must_use]
    pub fn current() -> Pid {
        PROCESS.with(|process| process.pid.clone())
    }

    /// Spawns the given `function` as a process on the current node and returns its [Pid].
    pub fn spawn<T>(function: T) -> Pid
    where
        T: Future<Output = ()> + Send + 'static,
    {
        let runtime = PROCESS.with(|process| process.runtime.clone());

        spawn_internal(runtime, function).0
    }

    /// Sends a single message to the local process `dest`.
    ///
    /// Messages to processes on other nodes or to dead processes are dropped.
    pub fn send<M: Send + 'static>(dest: &Pid, message: M) {
        PROCESS.with(|process| {
            if dest.node() != process.runtime.node() {
                #[cfg(feature = "tracing")]
                tracing::warn!(dest = ?dest, "Dropped message to a remote process");

                return;
            }

            process
                .runtime
                .deliver(dest, Message::User(message).into());
        });
    }

    /// Receives a single message from the current processes mailbox.
    ///
    /// User messages of a type other than `T` are discarded. Process down notifications
    /// are only surfaced while the monitor they belong to is still active.
    #[must_use]
    pub async fn receive<T: Send + 'static>() -> Message<T> {
        let channel = PROCESS.with(|process| process.channel.clone());

        loop {
            // The registry holds a sender for as long as this process lives.
            let Ok(item) = channel.recv_async().await else {
                return std::future::pending().await;
            };

            match item {
                ProcessItem::UserLocalMessage(message) => match message.downcast::<T>() {
                    Ok(message) => return Message::User(*message),
                    Err(_) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(process = ?Process::current(), "Discarded a message of an unexpected type");
                    }
                },
                ProcessItem::SystemMessage(system) => return Message::System(system),
                ProcessItem::MonitorProcessDown(pid, reference, exit_reason) => {
                    if PROCESS.with(|process| monitor_settle(process, &reference)) {
                        return Message::System(SystemMessage::ProcessDown(
                            pid,
                            reference,
                            exit_reason,
                        ));
                    }
                }
            }
        }
    }

    /// Terminates the local process `pid` with the given `exit_reason`.
    ///
    /// When `pid` is the current process, it exits at its next await point.
    pub fn exit<E: Into<ExitReason>>(pid: &Pid, exit_reason: E) {
        PROCESS.with(|process| {
            if pid.node() == process.runtime.node() {
                process.runtime.processes.exit(pid.id(), exit_reason.into());
            }
        });
    }

    /// Returns `true` if the given [Pid] is alive on the local node.
    #[must_use]
    pub fn alive(pid: &Pid) -> bool {
        PROCESS.with(|process| {
            pid.node() == process.runtime.node() && process.runtime.processes.alive(pid.id())
        })
    }

    /// Waits until `duration` has elapsed.
    pub async fn sleep(duration: Duration) {
        tokio::time::sleep(duration).await
    }

    /// Waits for `future` to complete, failing with [Timeout] once `duration` has elapsed.
    pub async fn timeout<F>(duration: Duration, future: F) -> Result<F::Output, Timeout>
    where
        F: Future,
    {
        pingora_timeout::timeout(duration, future)
            .await
            .map_err(|_| Timeout)
    }

    /// Starts monitoring the given process from the current process.
    ///
    /// Once the process goes down, a [SystemMessage::ProcessDown] carrying the returned
    /// [Reference] is delivered. A process that doesn't exist is reported down with `noproc`.
    ///
    /// Monitoring a process on another node is a request to that node's monitor service,
    /// failing with a [MonitorError] when the node can't be reached. A request whose reply
    /// is never received is rolled back on the target node.
    pub async fn monitor(pid: &Pid) -> Result<Reference, MonitorError> {
        let runtime = PROCESS.with(|process| process.runtime.clone());

        if pid.node() == runtime.node() {
            return Ok(runtime.monitor_install(pid));
        }

        let watcher = Process::current();
        let request = Monitor::new(pid.into(), (&watcher).into());

        let reply = runtime
            .transport
            .call(pid.node(), request.into(), runtime.options.call_timeout)
            .await?;

        let Frame::MonitorReply(reply) = reply else {
            return Err(MonitorError::BadReply(pid.node().clone()));
        };

        let reference = Reference::try_from(reply.reference)
            .ok()
            .filter(|reference| reference.node() == pid.node())
            .ok_or_else(|| MonitorError::BadReply(pid.node().clone()))?;

        PROCESS.with(|process| {
            process
                .monitors
                .borrow_mut()
                .insert(reference.clone(), pid.clone())
        });

        if let Some(service) = runtime.service() {
            service.send(ServiceMessage::Track(
                reference.clone(),
                watcher,
                pid.clone(),
            ));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(target_process = ?pid, reference = ?reference, "Remote monitor installed");

        Ok(reference)
    }

    /// Stops the monitor identified by `reference`.
    ///
    /// Once this returns, no [SystemMessage::ProcessDown] for `reference` is delivered.
    /// Cancelling a monitor that already fired, or was already cancelled, is a no-op.
    pub async fn demonitor(reference: &Reference) -> Result<(), MonitorError> {
        Self::demonitor_with(reference, DemonitorOptions::empty())
            .await
            .map(|_| ())
    }

    /// Stops the monitor identified by `reference` with the given options.
    ///
    /// With [DemonitorOptions::INFO], returns whether the monitor was still active,
    /// otherwise always returns `true`.
    pub async fn demonitor_with(
        reference: &Reference,
        options: DemonitorOptions,
    ) -> Result<bool, MonitorError> {
        let runtime = PROCESS.with(|process| process.runtime.clone());

        if reference.node() == runtime.node() {
            let found = runtime.monitor_cancel(reference);

            return Ok(found || !options.contains(DemonitorOptions::INFO));
        }

        let active = PROCESS.with(|process| process.monitors.borrow_mut().remove(reference));

        if active.is_some() {
            if let Some(service) = runtime.service() {
                service.send(ServiceMessage::Untrack(reference.clone()));
            }
        }

        let request = Demonitor::new(reference.into());

        let reply = runtime
            .transport
            .call(reference.node(), request.into(), runtime.options.call_timeout)
            .await?;

        let Frame::DemonitorReply(reply) = reply else {
            return Err(MonitorError::BadReply(reference.node().clone()));
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(reference = ?reference, found = reply.found, "Remote monitor cancelled");

        Ok(reply.found || !options.contains(DemonitorOptions::INFO))
    }

    /// Starts watching `node` from the current process.
    ///
    /// A [SystemMessage::NodeDown] is delivered once per call when the node goes down.
    /// Watching a node that is not a cluster member delivers it right away,
    /// watching the current node does nothing.
    pub async fn monitor_node<N: Into<Node>>(node: N) {
        let node = node.into();
        let (runtime, pid) = PROCESS.with(|process| (process.runtime.clone(), process.pid.clone()));

        if &node == runtime.node() {
            return;
        }

        let Some(service) = runtime.service() else {
            return;
        };

        let (tx, rx) = oneshot::channel();

        if service.send(ServiceMessage::MonitorNode(pid, node, tx)) {
            let _ = rx.await;
        }
    }

    /// Removes one watch of `node` held by the current process.
    ///
    /// Returns `false` if the current process wasn't watching `node`.
    pub async fn demonitor_node<N: Into<Node>>(node: N) -> bool {
        let node = node.into();
        let (runtime, pid) = PROCESS.with(|process| (process.runtime.clone(), process.pid.clone()));

        let Some(service) = runtime.service() else {
            return false;
        };

        let (tx, rx) = oneshot::channel();

        if !service.send(ServiceMessage::DemonitorNode(pid, node, tx)) {
            return false;
        }

        rx.await.unwrap_or_default()
    }
}

impl Drop for Process {
    fn drop(&mut self) {
        let exit_reason = self
            .runtime
            .processes
            .remove(self.pid.id())
            .and_then(|registration| registration.exit_reason)
            .unwrap_or(ExitReason::Normal);

        #[cfg(feature = "tracing")]
        tracing::trace!(process = ?self.pid, exit_reason = ?exit_reason, "Process has exited");

        self.runtime.monitor_process_down(&self.pid, exit_reason);

        let monitors = std::mem::take(self.monitors.get_mut());

        self.runtime.monitor_release(monitors);
    }
}

/// Marks a monitor as fired, returns `false` if it was no longer active.
///
/// A remote monitor is also dropped from the monitor service, in case its notification
/// raced ahead of the registration.
fn monitor_settle(process: &Process, reference: &Reference) -> bool {
    if process.monitors.borrow_mut().remove(reference).is_none() {
        return false;
    }

    if reference.node() != process.runtime.node() {
        if let Some(service) = process.runtime.service() {
            service.send(ServiceMessage::Untrack(reference.clone()));
        }
    }

    true
}

/// Internal spawn utility.
pub(crate) fn spawn_internal<T>(runtime: Arc<NodeRuntime>, function: T) -> (Pid, ProcessSend)
where
    T: Future<Output = ()> + Send + 'static,
{
    let (tx, rx) = flume::unbounded();

    let id = runtime
        .processes
        .insert(ProcessRegistration::new(tx.clone()));

    let pid = Pid::new(runtime.node().clone(), id);
    let process = Process::new(pid.clone(), rx, runtime.clone());

    // Spawn the process with the newly created process object in scope.
    let handle = tokio::spawn(PROCESS.scope(process, async move {
        if let Err(e) = AsyncCatchUnwind::new(AssertUnwindSafe(function)).await {
            PROCESS.with(|process| {
                #[cfg(feature = "tracing")]
                tracing::error!(process = ?process.pid, reason = ?e, "Process has panicked");

                process
                    .runtime
                    .processes
                    .set_exit_reason(process.pid.id(), ExitReason::from(e));
            });
        }
    }));

    runtime.processes.set_abort(id, handle.abort_handle());

    (pid, tx)
}
