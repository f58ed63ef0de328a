use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::Node;
use crate::Pid;
use crate::ProcessMonitor;
use crate::Reference;

/// A table of monitors keyed by token, with a secondary index bucketing tokens by node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct MonitorIndex {
    monitors: BTreeMap<Reference, ProcessMonitor>,
    nodes: BTreeMap<Node, SmallVec<[Reference; 4]>>,
}

impl MonitorIndex {
    fn insert(&mut self, node: Node, token: Reference, watcher: Pid, target: Pid) {
        // A reinsert replaces the old registration.
        self.remove(&token);

        self.nodes.entry(node.clone()).or_default().push(token.clone());
        self.monitors
            .insert(token, ProcessMonitor::new(node, target, watcher));
    }

    fn remove(&mut self, token: &Reference) -> Option<ProcessMonitor> {
        let monitor = self.monitors.remove(token)?;

        if let Some(bucket) = self.nodes.get_mut(&monitor.node) {
            bucket.retain(|existing| existing != token);

            if bucket.is_empty() {
                self.nodes.remove(&monitor.node);
            }
        }

        Some(monitor)
    }

    fn drain(&mut self, node: &Node) -> Vec<(Reference, ProcessMonitor)> {
        let Some(bucket) = self.nodes.remove(node) else {
            return Vec::new();
        };

        bucket
            .into_iter()
            .filter_map(|token| {
                self.monitors
                    .remove(&token)
                    .map(|monitor| (token, monitor))
            })
            .collect()
    }

    fn bucket(&self, node: &Node) -> &[Reference] {
        self.nodes
            .get(node)
            .map(|bucket| bucket.as_slice())
            .unwrap_or_default()
    }

    fn is_consistent(&self) -> bool {
        let bucketed: usize = self.nodes.values().map(|bucket| bucket.len()).sum();

        bucketed == self.monitors.len()
            && self.nodes.iter().all(|(node, bucket)| {
                !bucket.is_empty()
                    && bucket.iter().all(|token| {
                        self.monitors
                            .get(token)
                            .is_some_and(|monitor| &monitor.node == node)
                    })
            })
    }
}

/// The bookkeeping owned by a node's monitor service.
///
/// Holds three indices:
/// - monitors on local processes held by remote watchers, bucketed by the watcher's node.
/// - monitors held by local watchers on remote processes, bucketed by the target's node.
/// - node watches, local processes waiting for a node to go down.
///
/// Every monitor token is reachable from exactly one node bucket and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    inbound: MonitorIndex,
    outbound: MonitorIndex,
    watchers: BTreeMap<Node, SmallVec<[Pid; 4]>>,
}

impl Registry {
    /// Constructs a new empty [Registry].
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a monitor on the local process `target` held by `watcher`, indexed under `node`.
    pub fn add_process_monitor(&mut self, node: Node, token: Reference, watcher: Pid, target: Pid) {
        self.inbound.insert(node, token, watcher, target);
    }

    /// Removes the monitor for `token`, returning its `(target, watcher)` pair.
    ///
    /// Unknown tokens return [None].
    pub fn remove_process_monitor(&mut self, token: &Reference) -> Option<(Pid, Pid)> {
        self.inbound
            .remove(token)
            .map(|monitor| (monitor.target, monitor.watcher))
    }

    /// Removes and returns every monitor token indexed under `node`.
    pub fn drain_by_node(&mut self, node: &Node) -> Vec<Reference> {
        self.inbound
            .drain(node)
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    /// Records a monitor held by the local `watcher` on the remote process `target`, indexed under `node`.
    pub fn add_remote_monitor(&mut self, node: Node, token: Reference, watcher: Pid, target: Pid) {
        self.outbound.insert(node, token, watcher, target);
    }

    /// Removes the remote monitor for `token`, returning its `(target, watcher)` pair.
    pub fn remove_remote_monitor(&mut self, token: &Reference) -> Option<(Pid, Pid)> {
        self.outbound
            .remove(token)
            .map(|monitor| (monitor.target, monitor.watcher))
    }

    /// Removes and returns every remote monitor indexed under `node` as `(token, target, watcher)`.
    pub fn drain_remote_by_node(&mut self, node: &Node) -> Vec<(Reference, Pid, Pid)> {
        self.outbound
            .drain(node)
            .into_iter()
            .map(|(token, monitor)| (token, monitor.target, monitor.watcher))
            .collect()
    }

    /// Appends a watch of `node` by the local process `pid`.
    pub fn add_node_watch(&mut self, node: Node, pid: Pid) {
        self.watchers.entry(node).or_default().push(pid);
    }

    /// Removes one watch of `node` by `pid`, returns `false` if there was none.
    pub fn remove_node_watch(&mut self, node: &Node, pid: &Pid) -> bool {
        let Some(watchers) = self.watchers.get_mut(node) else {
            return false;
        };

        let Some(index) = watchers.iter().position(|watcher| watcher == pid) else {
            return false;
        };

        watchers.remove(index);

        if watchers.is_empty() {
            self.watchers.remove(node);
        }

        true
    }

    /// Removes and returns every watch of `node`, one entry per registration.
    pub fn drain_watchers(&mut self, node: &Node) -> Vec<Pid> {
        self.watchers
            .remove(node)
            .map(|watchers| watchers.into_vec())
            .unwrap_or_default()
    }

    /// Looks up the monitor registered for `token`.
    pub fn process_monitor(&self, token: &Reference) -> Option<&ProcessMonitor> {
        self.inbound.monitors.get(token)
    }

    /// Looks up the remote monitor registered for `token`.
    pub fn remote_monitor(&self, token: &Reference) -> Option<&ProcessMonitor> {
        self.outbound.monitors.get(token)
    }

    /// Returns the monitor tokens indexed under `node`.
    pub fn monitors_on(&self, node: &Node) -> &[Reference] {
        self.inbound.bucket(node)
    }

    /// Returns the remote monitor tokens indexed under `node`.
    pub fn remote_monitors_on(&self, node: &Node) -> &[Reference] {
        self.outbound.bucket(node)
    }

    /// Returns the processes watching `node`, one entry per registration.
    pub fn node_watchers(&self, node: &Node) -> &[Pid] {
        self.watchers
            .get(node)
            .map(|watchers| watchers.as_slice())
            .unwrap_or_default()
    }

    /// Returns the number of monitors on local processes.
    pub fn monitors_len(&self) -> usize {
        self.inbound.monitors.len()
    }

    /// Returns the number of monitors on remote processes.
    pub fn remote_monitors_len(&self) -> usize {
        self.outbound.monitors.len()
    }

    /// Returns the number of node watches.
    pub fn node_watches_len(&self) -> usize {
        self.watchers.values().map(|watchers| watchers.len()).sum()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.inbound.monitors.is_empty()
            && self.outbound.monitors.is_empty()
            && self.watchers.is_empty()
    }

    /// Returns `true` if every monitor is reachable from exactly one node bucket, and no bucket is empty.
    pub fn is_consistent(&self) -> bool {
        self.inbound.is_consistent()
            && self.outbound.is_consistent()
            && self.watchers.values().all(|watchers| !watchers.is_empty())
    }
}
