mod common;

use lookout::Node;
use lookout::Registry;

use common::*;

#[test]
fn add_then_remove_restores_registry() {
    let mut registry = Registry::new();

    registry.add_process_monitor(Node::from("b"), reference("a", 1), pid("b", 7), pid("a", 3));

    let previous = registry.clone();

    registry.add_process_monitor(Node::from("b"), reference("a", 2), pid("b", 8), pid("a", 4));

    assert_eq!(registry.monitors_len(), 2);
    assert_eq!(registry.monitors_on(&Node::from("b")).len(), 2);

    let removed = registry.remove_process_monitor(&reference("a", 2));

    assert_eq!(removed, Some((pid("a", 4), pid("b", 8))));
    assert_eq!(registry, previous);
    assert!(registry.is_consistent());
}

#[test]
fn remove_unknown_monitor_is_noop() {
    let mut registry = Registry::new();

    registry.add_process_monitor(Node::from("b"), reference("a", 1), pid("b", 7), pid("a", 3));

    let previous = registry.clone();

    assert_eq!(registry.remove_process_monitor(&reference("a", 99)), None);
    assert_eq!(registry.remove_process_monitor(&reference("a", 1)), Some((pid("a", 3), pid("b", 7))));
    assert_eq!(registry.remove_process_monitor(&reference("a", 1)), None);

    assert_ne!(registry, previous);
    assert!(registry.is_empty());
    assert!(registry.is_consistent());
}

#[test]
fn remove_last_monitor_deletes_bucket() {
    let mut registry = Registry::new();

    registry.add_process_monitor(Node::from("b"), reference("a", 1), pid("b", 7), pid("a", 3));
    registry.remove_process_monitor(&reference("a", 1));

    assert!(registry.monitors_on(&Node::from("b")).is_empty());
    assert_eq!(registry, Registry::new());
}

#[test]
fn drain_by_node_leaves_no_residue() {
    let mut registry = Registry::new();

    registry.add_process_monitor(Node::from("b"), reference("a", 1), pid("b", 7), pid("a", 3));
    registry.add_process_monitor(Node::from("b"), reference("a", 2), pid("b", 7), pid("a", 3));
    registry.add_process_monitor(Node::from("c"), reference("a", 3), pid("c", 1), pid("a", 3));

    let mut drained = registry.drain_by_node(&Node::from("b"));

    drained.sort();

    assert_eq!(drained, vec![reference("a", 1), reference("a", 2)]);
    assert!(registry.process_monitor(&reference("a", 1)).is_none());
    assert!(registry.process_monitor(&reference("a", 2)).is_none());
    assert!(registry.monitors_on(&Node::from("b")).is_empty());

    // Monitors keyed on other nodes are untouched.
    let remaining = registry.process_monitor(&reference("a", 3)).unwrap();

    assert_eq!(remaining.node, Node::from("c"));
    assert_eq!(remaining.watcher, pid("c", 1));
    assert_eq!(registry.monitors_len(), 1);
    assert!(registry.is_consistent());
}

#[test]
fn drain_unknown_node_is_empty() {
    let mut registry = Registry::new();

    assert!(registry.drain_by_node(&Node::from("b")).is_empty());
    assert!(registry.drain_remote_by_node(&Node::from("b")).is_empty());
    assert!(registry.drain_watchers(&Node::from("b")).is_empty());
    assert!(registry.is_empty());
}

#[test]
fn node_watches_keep_multiplicity() {
    let mut registry = Registry::new();

    let watcher = pid("a", 5);

    registry.add_node_watch(Node::from("b"), watcher.clone());
    registry.add_node_watch(Node::from("b"), watcher.clone());
    registry.add_node_watch(Node::from("b"), pid("a", 6));

    assert_eq!(registry.node_watches_len(), 3);

    assert!(registry.remove_node_watch(&Node::from("b"), &watcher));
    assert_eq!(
        registry.node_watchers(&Node::from("b")),
        &[watcher.clone(), pid("a", 6)]
    );

    assert!(!registry.remove_node_watch(&Node::from("c"), &watcher));
    assert!(!registry.remove_node_watch(&Node::from("b"), &pid("a", 9)));

    let drained = registry.drain_watchers(&Node::from("b"));

    assert_eq!(drained, vec![watcher, pid("a", 6)]);
    assert!(registry.node_watchers(&Node::from("b")).is_empty());
    assert!(registry.is_empty());
}

#[test]
fn remote_monitors_are_indexed_separately() {
    let mut registry = Registry::new();

    registry.add_process_monitor(Node::from("b"), reference("a", 1), pid("b", 7), pid("a", 3));
    registry.add_remote_monitor(Node::from("b"), reference("b", 1), pid("a", 3), pid("b", 7));

    assert_eq!(registry.monitors_len(), 1);
    assert_eq!(registry.remote_monitors_len(), 1);

    assert_eq!(
        registry.drain_remote_by_node(&Node::from("b")),
        vec![(reference("b", 1), pid("b", 7), pid("a", 3))]
    );

    assert_eq!(registry.remote_monitors_len(), 0);
    assert!(registry.remote_monitors_on(&Node::from("b")).is_empty());
    assert_eq!(registry.monitors_len(), 1);

    assert_eq!(registry.remove_remote_monitor(&reference("b", 1)), None);
    assert!(registry.is_consistent());
}

#[test]
fn reinserting_a_token_replaces_it() {
    let mut registry = Registry::new();

    registry.add_process_monitor(Node::from("b"), reference("a", 1), pid("b", 7), pid("a", 3));
    registry.add_process_monitor(Node::from("c"), reference("a", 1), pid("c", 2), pid("a", 3));

    assert_eq!(registry.monitors_len(), 1);
    assert!(registry.monitors_on(&Node::from("b")).is_empty());
    assert_eq!(registry.monitors_on(&Node::from("c")), &[reference("a", 1)]);
    assert!(registry.is_consistent());
}
