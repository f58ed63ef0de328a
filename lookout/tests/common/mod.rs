#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use lookout::Cluster;
use lookout::LocalNode;
use lookout::Message;
use lookout::NodeOptions;
use lookout::Pid;
use lookout::Process;
use lookout::Reference;
use lookout::Registry;
use lookout::RemoteRef;

/// Runs `function` as a process on `node` and returns its output.
pub async fn run_on<T, R>(node: &LocalNode, function: T) -> R
where
    T: Future<Output = R> + Send + 'static,
    R: Send + 'static,
{
    let (tx, rx) = tokio::sync::oneshot::channel();

    node.spawn(async move {
        let _ = tx.send(function.await);
    });

    rx.await.expect("test process panicked")
}

/// Starts a cluster with one node per name, all using `options`.
pub fn cluster_with(names: &[&str], options: NodeOptions) -> (Cluster, Vec<LocalNode>) {
    let cluster = Cluster::new();

    let nodes = names
        .iter()
        .map(|name| cluster.start_node(*name, options))
        .collect();

    (cluster, nodes)
}

/// Starts a cluster with one node per name.
pub fn cluster(names: &[&str]) -> (Cluster, Vec<LocalNode>) {
    cluster_with(names, NodeOptions::new())
}

/// Spawns a process that lives until it is told to exit.
pub fn spawn_idle(node: &LocalNode) -> Pid {
    node.spawn(async {
        loop {
            let _ = Process::receive::<()>().await;
        }
    })
}

/// Receives the next message, or [None] if nothing arrives in time.
pub async fn receive_within<T: Send + 'static>(duration: Duration) -> Option<Message<T>> {
    Process::timeout(duration, Process::receive::<T>()).await.ok()
}

/// Polls the registry of `node` until `predicate` holds, returning the last snapshot.
pub async fn registry_until<F>(node: &LocalNode, predicate: F) -> Registry
where
    F: Fn(&Registry) -> bool,
{
    let mut registry = node.registry().await.expect("monitor service is gone");

    for _ in 0..100 {
        if predicate(&registry) {
            break;
        }

        tokio::time::sleep(Duration::from_millis(10)).await;

        registry = node.registry().await.expect("monitor service is gone");
    }

    registry
}

/// Builds a [Pid] as another node would see it.
pub fn pid(node: &str, id: u64) -> Pid {
    Pid::try_from(RemoteRef::Process {
        node: node.into(),
        id,
    })
    .unwrap()
}

/// Builds a monitor [Reference] as another node would see it.
pub fn reference(node: &str, id: u64) -> Reference {
    Reference::try_from(RemoteRef::Monitor {
        node: node.into(),
        id,
    })
    .unwrap()
}
