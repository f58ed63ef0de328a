mod common;

use std::collections::BTreeMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use lookout::Node;
use lookout::Pid;
use lookout::Process;
use lookout::Reference;
use lookout::Registry;

use common::*;

const NODES: [&str; 4] = ["b", "c", "d", "e"];

/// Applies random registry operations, checking the registry against a plain map after each one.
fn registry_matches_model(seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut registry = Registry::new();
    let mut model: BTreeMap<Reference, (Node, Pid, Pid)> = BTreeMap::new();
    let mut next_token = 1;

    for _ in 0..2000 {
        match rng.gen_range(0..10) {
            0..=4 => {
                let node = Node::from(NODES[rng.gen_range(0..NODES.len())]);
                let token = reference("a", next_token);
                let watcher = pid(node.name(), rng.gen_range(1..8));
                let target = pid("a", rng.gen_range(1..8));

                next_token += 1;

                registry.add_process_monitor(node.clone(), token.clone(), watcher.clone(), target.clone());
                model.insert(token, (node, watcher, target));
            }
            5..=7 => {
                // Sometimes a token that was never handed out.
                let token = reference("a", rng.gen_range(1..next_token + 3));

                let expected = model
                    .remove(&token)
                    .map(|(_, watcher, target)| (target, watcher));

                assert_eq!(registry.remove_process_monitor(&token), expected);
            }
            _ => {
                let node = Node::from(NODES[rng.gen_range(0..NODES.len())]);

                let mut drained = registry.drain_by_node(&node);
                let mut expected: Vec<Reference> = model
                    .iter()
                    .filter(|(_, (owner, _, _))| owner == &node)
                    .map(|(token, _)| token.clone())
                    .collect();

                model.retain(|_, (owner, _, _)| owner != &node);

                drained.sort();
                expected.sort();

                assert_eq!(drained, expected);
                assert!(registry.monitors_on(&node).is_empty());
            }
        }

        assert!(registry.is_consistent());
        assert_eq!(registry.monitors_len(), model.len());

        for (token, (node, watcher, target)) in &model {
            let monitor = registry.process_monitor(token).unwrap();

            assert_eq!(&monitor.node, node);
            assert_eq!(&monitor.watcher, watcher);
            assert_eq!(&monitor.target, target);
            assert!(registry.monitors_on(node).contains(token));
        }
    }
}

#[test]
fn randomized_registry_operations() {
    for seed in 0..8 {
        registry_matches_model(seed);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn randomized_cluster_interleavings() {
    let (cluster, nodes) = cluster(&["a", "b", "c"]);
    let (a, b, c) = (nodes[0].clone(), nodes[1].clone(), nodes[2].clone());

    let targets: Vec<Pid> = (0..4)
        .map(|index| spawn_idle(if index % 2 == 0 { &b } else { &c }))
        .collect();

    let mut reports = Vec::new();
    let mut stops = Vec::new();

    for seed in 0..6u64 {
        let targets = targets.clone();
        let (report_tx, report_rx) = tokio::sync::oneshot::channel();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        a.spawn(async move {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut held: Vec<Reference> = Vec::new();

            for _ in 0..40 {
                if held.is_empty() || rng.gen_bool(0.6) {
                    let target = &targets[rng.gen_range(0..targets.len())];

                    held.push(Process::monitor(target).await.unwrap());
                } else {
                    let reference = held.swap_remove(rng.gen_range(0..held.len()));

                    Process::demonitor(&reference).await.unwrap();
                }

                if rng.gen_bool(0.2) {
                    Process::sleep(Duration::from_millis(1)).await;
                }
            }

            let _ = report_tx.send(held);
            let _ = stop_rx.await;
        });

        reports.push(report_rx);
        stops.push(stop_tx);
    }

    let mut held = Vec::new();

    for report in reports {
        held.extend(report.await.unwrap());
    }

    let a_registry = a.registry().await.unwrap();
    let b_registry = b.registry().await.unwrap();
    let c_registry = c.registry().await.unwrap();

    assert_eq!(a_registry.remote_monitors_len(), held.len());
    assert_eq!(b_registry.monitors_len() + c_registry.monitors_len(), held.len());

    for reference in &held {
        assert!(a_registry.remote_monitor(reference).is_some());

        let owner = if reference.node() == b.node() { &b_registry } else { &c_registry };

        assert!(owner.process_monitor(reference).is_some());
    }

    assert!(a_registry.is_consistent());
    assert!(b_registry.is_consistent());
    assert!(c_registry.is_consistent());

    cluster.disconnect("b");

    let on_c = held
        .iter()
        .filter(|reference| reference.node() == c.node())
        .count();

    let a_registry = registry_until(&a, |registry| {
        registry.remote_monitors_on(&Node::from("b")).is_empty()
    })
    .await;

    assert_eq!(a_registry.remote_monitors_len(), on_c);
    assert!(a_registry.is_consistent());

    let c_registry = c.registry().await.unwrap();

    assert_eq!(c_registry.monitors_len(), on_c);

    for stop in stops {
        let _ = stop.send(());
    }

    let c_registry = registry_until(&c, |registry| registry.is_empty()).await;

    assert!(c_registry.is_empty());
    assert!(registry_until(&a, |registry| registry.is_empty()).await.is_empty());
}
