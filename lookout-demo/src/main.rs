use std::time::Duration;

use lookout::Cluster;
use lookout::Message;
use lookout::NodeOptions;
use lookout::Process;
use lookout::SystemMessage;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cluster = Cluster::new();

    let alpha = cluster.start_node("alpha", NodeOptions::new());
    let beta = cluster.start_node("beta", NodeOptions::new());
    let gamma = cluster.start_node("gamma", NodeOptions::new());

    // A worker on beta that crashes after a while.
    let worker = beta.spawn(async {
        Process::sleep(Duration::from_millis(200)).await;
        panic!("worker ran out of luck");
    });

    // A worker on gamma that lives until gamma leaves the cluster.
    let sentinel = gamma.spawn(async {
        loop {
            let _ = Process::receive::<()>().await;
        }
    });

    let (done_tx, done_rx) = tokio::sync::oneshot::channel();

    alpha.spawn(async move {
        let watcher = Process::current();

        tracing::info!(watcher = ?watcher, "Watching the cluster");

        for target in [&worker, &sentinel] {
            match Process::monitor(target).await {
                Ok(reference) => tracing::info!(target_process = ?target, reference = ?reference, "Monitoring"),
                Err(error) => tracing::error!(target_process = ?target, error = %error, "Monitor failed"),
            }
        }

        Process::monitor_node("gamma").await;
        Process::monitor_node("delta").await;

        for _ in 0..4 {
            match Process::receive::<()>().await {
                Message::System(SystemMessage::ProcessDown(pid, reference, exit_reason)) => {
                    tracing::info!(process = ?pid, reference = ?reference, exit_reason = ?exit_reason, "Process went down");
                }
                Message::System(SystemMessage::NodeDown(node)) => {
                    tracing::info!(node = ?node, "Node went down");
                }
                Message::User(()) => {}
            }
        }

        let _ = done_tx.send(());
    });

    tokio::time::sleep(Duration::from_millis(500)).await;

    cluster.disconnect("gamma");

    let _ = done_rx.await;

    if let Some(registry) = alpha.registry().await {
        tracing::info!(registry = ?registry, "Final registry of alpha");
    }
}
