use std::collections::BTreeSet;
use std::io::Error;
use std::io::ErrorKind;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use arc_swap::ArcSwap;

use bytes::BytesMut;

use dashmap::DashMap;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use tokio_util::codec::Decoder;
use tokio_util::codec::Encoder;

use crate::frame::Codec;
use crate::frame::Frame;

use crate::LocalNode;
use crate::MonitorError;
use crate::Node;
use crate::NodeOptions;
use crate::NodePattern;
use crate::ServiceInbox;
use crate::Transport;

/// Shared cluster state.
struct ClusterInner {
    members: ArcSwap<BTreeSet<Node>>,
    members_lock: Mutex<()>,
    endpoints: DashMap<Node, ServiceInbox>,
    subscriptions: DashMap<Node, Vec<(NodePattern, ServiceInbox)>>,
}

/// An in-memory cluster of nodes sharing one tokio runtime.
///
/// Every frame exchanged between nodes goes through the wire [Codec], and nodes only reach
/// each other while both are members of the cluster view.
#[derive(Clone)]
pub struct Cluster {
    inner: Arc<ClusterInner>,
}

impl Cluster {
    /// Constructs a new empty [Cluster].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ClusterInner {
                members: ArcSwap::new(Arc::new(BTreeSet::new())),
                members_lock: Mutex::new(()),
                endpoints: DashMap::new(),
                subscriptions: DashMap::new(),
            }),
        }
    }

    /// Starts a node with the given name and joins it to the cluster.
    ///
    /// A node already running under that name is replaced, it no longer receives frames
    /// or down events from the cluster.
    pub fn start_node<N: Into<Node>>(&self, node: N, options: NodeOptions) -> LocalNode {
        let node = node.into();

        if self.inner.subscriptions.remove(&node).is_some() {
            #[cfg(feature = "tracing")]
            tracing::warn!(node = ?node, "Replacing a running node");
        }

        let transport = MemoryTransport {
            node: node.clone(),
            cluster: self.inner.clone(),
        };

        let local = LocalNode::start(node.clone(), options, Arc::new(transport));

        self.inner
            .endpoints
            .insert(node.clone(), local.inbox().clone());

        self.connect(node);

        local
    }

    /// Adds a node to the cluster view, returns `false` if it already was a member.
    pub fn connect<N: Into<Node>>(&self, node: N) -> bool {
        let node = node.into();

        let _members_lock = self
            .inner
            .members_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut members = BTreeSet::clone(&self.inner.members.load());

        if !members.insert(node) {
            return false;
        }

        self.inner.members.store(Arc::new(members));

        true
    }

    /// Removes a node from the cluster view, returns `false` if it wasn't a member.
    ///
    /// Every remaining member observes the node going down, and the node observes every
    /// remaining member going down.
    pub fn disconnect<N: Into<Node>>(&self, node: N) -> bool {
        let node = node.into();

        let remaining = {
            let _members_lock = self
                .inner
                .members_lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            let mut members = BTreeSet::clone(&self.inner.members.load());

            if !members.remove(&node) {
                return false;
            }

            self.inner.members.store(Arc::new(members.clone()));

            members
        };

        #[cfg(feature = "tracing")]
        tracing::info!(node = ?node, "Node disconnected from the cluster");

        for subscriptions in self.inner.subscriptions.iter() {
            let subscriber = subscriptions.key();

            if subscriber == &node {
                for member in &remaining {
                    publish_node_down(subscriptions.value(), member);
                }
            } else if remaining.contains(subscriber) {
                publish_node_down(subscriptions.value(), &node);
            }
        }

        true
    }

    /// Returns the current members of the cluster view.
    pub fn members(&self) -> Vec<Node> {
        self.inner.members.load().iter().cloned().collect()
    }

    /// Returns `true` if `node` is a member of the cluster view.
    pub fn is_member(&self, node: &Node) -> bool {
        self.inner.members.load().contains(node)
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Self::new()
    }
}

/// Pushes a node down event to every subscription matching `node`.
fn publish_node_down(subscriptions: &[(NodePattern, ServiceInbox)], node: &Node) {
    for (pattern, inbox) in subscriptions {
        if pattern.matches(node) {
            inbox.node_down(node.clone());
        }
    }
}

/// Moves a frame across a node boundary.
fn transcode(frame: Frame) -> Result<Frame, Error> {
    let mut codec = Codec::new();
    let mut buffer = BytesMut::new();

    codec.encode(frame, &mut buffer)?;
    codec
        .decode(&mut buffer)?
        .ok_or_else(|| Error::new(ErrorKind::UnexpectedEof, "truncated frame"))
}

/// The [Transport] of a node in a [Cluster].
struct MemoryTransport {
    node: Node,
    cluster: Arc<ClusterInner>,
}

impl MemoryTransport {
    /// Looks up the monitor service of `node`, if it can be reached from this node.
    fn endpoint(&self, node: &Node) -> Option<ServiceInbox> {
        if !self.is_member(node) {
            return None;
        }

        self.cluster
            .endpoints
            .get(node)
            .map(|endpoint| endpoint.value().clone())
    }
}

impl Transport for MemoryTransport {
    fn forward(&self, node: &Node, frame: Frame) {
        let Some(endpoint) = self.endpoint(node) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(from = ?self.node, to = ?node, kind = frame.kind(), "Dropped frame to an unreachable node");

            return;
        };

        match transcode(frame) {
            Ok(frame) => {
                endpoint.deliver(frame);
            }
            #[allow(unused_variables)]
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(from = ?self.node, to = ?node, error = ?e, "Failed to encode frame");
            }
        }
    }

    fn call(
        &self,
        node: &Node,
        frame: Frame,
        timeout: Duration,
    ) -> BoxFuture<'static, Result<Frame, MonitorError>> {
        let node = node.clone();
        let endpoint = self.endpoint(&node);

        async move {
            let Some(endpoint) = endpoint else {
                return Err(MonitorError::NoConnection(node));
            };

            let Ok(frame) = transcode(frame) else {
                return Err(MonitorError::NoConnection(node));
            };

            match pingora_timeout::timeout(timeout, endpoint.request(frame)).await {
                Ok(Ok(reply)) => transcode(reply).map_err(|_| MonitorError::BadReply(node)),
                Ok(Err(_)) => Err(MonitorError::NoConnection(node)),
                Err(_) => Err(MonitorError::Timeout(node)),
            }
        }
        .boxed()
    }

    fn subscribe_node_down(&self, pattern: NodePattern, inbox: ServiceInbox) {
        self.cluster
            .subscriptions
            .entry(self.node.clone())
            .or_default()
            .push((pattern, inbox));
    }

    fn is_member(&self, node: &Node) -> bool {
        let members = self.cluster.members.load();

        members.contains(&self.node) && members.contains(node)
    }
}
