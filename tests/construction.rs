mod common;

use common::node_at;
use treecrdt::{DefaultTreeCrdt, LogicalClock, MemoryDeferredQueue, MemoryLog, NodeId};

#[test]
fn from_nodes_rebuilds_indexes_regardless_of_input_order() {
    let forward = vec![
        node_at("a", "", 1, 0.3),
        node_at("a1", "a", 2, 0.4),
        node_at("a2", "a", 3, 0.6),
        node_at("b", "", 4, 0.7),
    ];
    let mut shuffled = forward.clone();
    shuffled.reverse();

    let in_order =
        DefaultTreeCrdt::<String>::from_nodes(forward, LogicalClock::default(), MemoryLog::new(), MemoryDeferredQueue::new());
    let out_of_order =
        DefaultTreeCrdt::<String>::from_nodes(shuffled, LogicalClock::default(), MemoryLog::new(), MemoryDeferredQueue::new());

    assert_eq!(in_order.child_list(&NodeId::root()), out_of_order.child_list(&NodeId::root()));
    assert_eq!(in_order.child_list(&NodeId::from("a")), out_of_order.child_list(&NodeId::from("a")));
    assert_eq!(in_order.get_node(&NodeId::from("a2")), out_of_order.get_node(&NodeId::from("a2")));
}

#[test]
fn from_nodes_ignores_a_root_sentinel_entry() {
    let nodes = vec![node_at("", "", 0, 0.5), node_at("a", "", 1, 0.3)];
    let tree =
        DefaultTreeCrdt::<String>::from_nodes(nodes, LogicalClock::default(), MemoryLog::new(), MemoryDeferredQueue::new());
    assert_eq!(tree.get_nodes().count(), 1);
    assert_eq!(tree.child_list(&NodeId::root()), &[NodeId::from("a")]);
}

#[test]
fn root_sentinel_is_always_present_even_in_an_empty_replica() {
    let tree = DefaultTreeCrdt::<String>::from_nodes(
        Vec::new(),
        LogicalClock::default(),
        MemoryLog::new(),
        MemoryDeferredQueue::new(),
    );
    assert!(tree.child_list(&NodeId::root()).is_empty());
    assert!(tree.get_node(&NodeId::root()).is_none());
}
