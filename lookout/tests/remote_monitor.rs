mod common;

use std::time::Duration;

use lookout::frame::Demonitor;
use lookout::frame::DemonitorReply;
use lookout::frame::Frame;
use lookout::frame::Monitor;
use lookout::DemonitorOptions;
use lookout::Message;
use lookout::MonitorError;
use lookout::Node;
use lookout::Process;
use lookout::Reference;
use lookout::SystemMessage;

use common::*;

#[tokio::test]
async fn remote_monitor_delivers_exactly_once() {
    let (_cluster, nodes) = cluster(&["a", "b"]);
    let (a, b) = (nodes[0].clone(), nodes[1].clone());

    let target = spawn_idle(&b);
    let remote = b.clone();

    run_on(&a, async move {
        let reference = Process::monitor(&target).await.unwrap();

        assert!(reference.is_remote());
        assert_eq!(reference.node(), &Node::from("b"));

        remote.exit(&target, "shutdown");

        let message: Message<()> = Process::receive().await;

        if let Message::System(SystemMessage::ProcessDown(object, mref, exit_reason)) = message {
            assert_eq!(object, target);
            assert_eq!(mref, reference);
            assert_eq!(exit_reason, "shutdown");
        } else {
            panic!("Expected process down message!");
        }

        assert!(receive_within::<()>(Duration::from_millis(100)).await.is_none());
    })
    .await;

    let a_registry = registry_until(&a, |registry| registry.is_empty()).await;
    let b_registry = registry_until(&b, |registry| registry.is_empty()).await;

    assert!(a_registry.is_empty());
    assert!(b_registry.is_empty());
    assert_eq!(b.monitored_processes(), 0);
}

#[tokio::test]
async fn remote_monitor_is_registered_on_both_nodes() {
    let (_cluster, nodes) = cluster(&["a", "b"]);
    let (a, b) = (nodes[0].clone(), nodes[1].clone());

    let target = spawn_idle(&b);
    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
    let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();

    let watcher = a.spawn(async move {
        let reference = Process::monitor(&target).await.unwrap();

        let _ = ready_tx.send((Process::current(), reference));
        let _ = done_rx.await;
    });

    let (current, reference) = ready_rx.await.unwrap();

    assert_eq!(current, watcher);

    let b_registry = b.registry().await.unwrap();
    let monitor = b_registry.process_monitor(&reference).unwrap();

    assert_eq!(monitor.node, Node::from("a"));
    assert_eq!(monitor.watcher, watcher);
    assert_eq!(b_registry.monitors_on(&Node::from("a")), &[reference.clone()]);
    assert!(b_registry.is_consistent());

    let a_registry = a.registry().await.unwrap();
    let remote = a_registry.remote_monitor(&reference).unwrap();

    assert_eq!(remote.node, Node::from("b"));
    assert_eq!(remote.watcher, watcher);
    assert_eq!(a_registry.monitors_len(), 0);
    assert!(a_registry.is_consistent());

    let _ = done_tx.send(());
}

#[tokio::test]
async fn remote_demonitor_is_idempotent() {
    let (_cluster, nodes) = cluster(&["a", "b"]);
    let (a, b) = (nodes[0].clone(), nodes[1].clone());

    let target = spawn_idle(&b);
    let remote = b.clone();

    run_on(&a, async move {
        let reference = Process::monitor(&target).await.unwrap();

        assert_eq!(Process::demonitor(&reference).await, Ok(()));
        assert_eq!(Process::demonitor(&reference).await, Ok(()));

        remote.exit(&target, "shutdown");

        assert!(receive_within::<()>(Duration::from_millis(100)).await.is_none());
    })
    .await;

    assert!(a.registry().await.unwrap().is_empty());
    assert!(b.registry().await.unwrap().is_empty());
    assert_eq!(b.monitored_processes(), 0);
}

#[tokio::test]
async fn remote_demonitor_info() {
    let (_cluster, nodes) = cluster(&["a", "b"]);
    let target = spawn_idle(&nodes[1]);

    run_on(&nodes[0], async move {
        let reference = Process::monitor(&target).await.unwrap();

        assert_eq!(
            Process::demonitor_with(&reference, DemonitorOptions::INFO).await,
            Ok(true)
        );
        assert_eq!(
            Process::demonitor_with(&reference, DemonitorOptions::INFO).await,
            Ok(false)
        );
        assert_eq!(
            Process::demonitor_with(&reference, DemonitorOptions::empty()).await,
            Ok(true)
        );
    })
    .await;
}

#[tokio::test]
async fn remote_demonitor_after_down_discards_it() {
    let (_cluster, nodes) = cluster(&["a", "b"]);
    let target = spawn_idle(&nodes[1]);
    let remote = nodes[1].clone();

    run_on(&nodes[0], async move {
        let reference = Process::monitor(&target).await.unwrap();

        remote.exit(&target, "shutdown");

        // Let the notification reach this process's mailbox.
        Process::sleep(Duration::from_millis(50)).await;

        assert_eq!(
            Process::demonitor_with(&reference, DemonitorOptions::INFO).await,
            Ok(false)
        );

        assert!(receive_within::<()>(Duration::from_millis(100)).await.is_none());
    })
    .await;
}

#[tokio::test]
async fn remote_monitor_noproc() {
    let (_cluster, nodes) = cluster(&["a", "b"]);

    let target = nodes[1].spawn(async {
        // End immediately.
    });

    tokio::time::sleep(Duration::from_millis(10)).await;

    run_on(&nodes[0], async move {
        let reference = Process::monitor(&target).await.unwrap();

        let message: Message<()> = Process::receive().await;

        if let Message::System(SystemMessage::ProcessDown(object, mref, exit_reason)) = message {
            assert_eq!(object, target);
            assert_eq!(mref, reference);
            assert_eq!(exit_reason, "noproc");
        } else {
            panic!("Expected process down message!");
        }
    })
    .await;
}

#[tokio::test]
async fn remote_monitor_unreachable_node() {
    let (cluster, nodes) = cluster(&["a", "c"]);

    let target = spawn_idle(&nodes[1]);

    assert!(cluster.disconnect("c"));

    let result = run_on(&nodes[0], async move { Process::monitor(&target).await }).await;

    assert_eq!(result, Err(MonitorError::NoConnection(Node::from("c"))));
    assert!(nodes[0].registry().await.unwrap().is_empty());
}

#[tokio::test]
async fn remote_monitor_unknown_node() {
    let (_cluster, nodes) = cluster(&["a"]);

    let result = run_on(&nodes[0], async {
        Process::monitor(&pid("nowhere", 1)).await
    })
    .await;

    assert_eq!(result, Err(MonitorError::NoConnection(Node::from("nowhere"))));
}

#[tokio::test]
async fn watcher_exit_releases_remote_monitors() {
    let (_cluster, nodes) = cluster(&["a", "b"]);
    let (a, b) = (nodes[0].clone(), nodes[1].clone());

    let target = spawn_idle(&b);
    let watched = target.clone();

    run_on(&a, async move {
        Process::monitor(&watched).await.unwrap();
        Process::monitor(&watched).await.unwrap();
    })
    .await;

    let b_registry = registry_until(&b, |registry| registry.is_empty()).await;
    let a_registry = registry_until(&a, |registry| registry.is_empty()).await;

    assert!(b_registry.is_empty());
    assert!(a_registry.is_empty());
    assert_eq!(b.monitored_processes(), 0);
    assert!(b.alive(&target));
}

#[tokio::test]
async fn unanswered_monitor_request_is_rolled_back() {
    let (_cluster, nodes) = cluster(&["a", "b"]);
    let b = nodes[1].clone();

    let target = spawn_idle(&b);
    let watcher = pid("a", 1);
    let request = || -> Frame { Monitor::new((&target).into(), (&watcher).into()).into() };

    // The caller stops waiting before the service gets to the request.
    drop(b.inbox().request(request()));

    let Frame::MonitorReply(reply) = b.inbox().request(request()).await.unwrap() else {
        panic!("Expected monitor reply!");
    };

    let reference = Reference::try_from(reply.reference).unwrap();
    let registry = b.registry().await.unwrap();

    assert_eq!(registry.monitors_len(), 1);
    assert!(registry.process_monitor(&reference).is_some());

    let reply = b
        .inbox()
        .request(Demonitor::new((&reference).into()).into())
        .await
        .unwrap();

    assert_eq!(reply, Frame::DemonitorReply(DemonitorReply::new(true)));
    assert!(b.registry().await.unwrap().is_empty());
    assert_eq!(b.monitored_processes(), 0);
    assert!(b.alive(&target));
}
