//! End-to-end convergence scenarios over a small shared fixture: `a` under
//! root with children `a1`, `a2`; `b` under root with children `b1..b4`.
//! Each scenario drives two independently-seeded replicas through a
//! concurrent pair of operations and checks they converge to the same
//! observable state regardless of merge direction.

mod common;

use common::node_at;
use treecrdt::{DefaultTreeCrdt, NodeId, Operation};

fn fixture() -> Vec<Operation<String, u64>> {
    vec![
        Operation::insert(1, NodeId::root(), node_at("a", "", 1, 0.3)),
        Operation::insert(2, NodeId::root(), node_at("b", "", 2, 0.6)),
        Operation::insert(3, NodeId::from("a"), node_at("a1", "a", 3, 0.2)),
        Operation::insert(4, NodeId::from("a"), node_at("a2", "a", 4, 0.4)),
        Operation::insert(5, NodeId::from("b"), node_at("b1", "b", 5, 0.1)),
        Operation::insert(6, NodeId::from("b"), node_at("b2", "b", 6, 0.2)),
        Operation::insert(7, NodeId::from("b"), node_at("b3", "b", 7, 0.3)),
        Operation::insert(8, NodeId::from("b"), node_at("b4", "b", 8, 0.4)),
    ]
}

fn seeded_pair() -> (DefaultTreeCrdt<String>, DefaultTreeCrdt<String>) {
    let mut a = DefaultTreeCrdt::<String>::default();
    let mut b = DefaultTreeCrdt::<String>::default();
    a.merge(fixture());
    b.merge(fixture());
    (a, b)
}

fn siblings(tree: &DefaultTreeCrdt<String>, parent: &str) -> Vec<String> {
    tree.child_list(&NodeId::from(parent))
        .iter()
        .map(|id| id.as_str().to_string())
        .collect()
}

/// Scenario 1: two replicas each insert a new sibling immediately after the
/// same reference node (`a2`). After mutual merge both must contain both
/// new nodes, in the same relative order.
#[test]
fn concurrent_insert_after_the_same_node() {
    let (mut r_a, mut r_b) = seeded_pair();

    let a3 = Operation::insert(9, NodeId::from("a"), node_at("a3", "a", 9, 0.64));
    let a4 = Operation::insert(11, NodeId::from("a"), node_at("a4", "a", 11, 0.65));

    r_a.merge(vec![a3.clone()]);
    r_b.merge(vec![a4.clone()]);
    r_a.merge(vec![a4]);
    r_b.merge(vec![a3]);

    let expected = vec!["a1", "a2", "a3", "a4"];
    assert_eq!(siblings(&r_a, "a"), expected);
    assert_eq!(siblings(&r_b, "a"), expected);
}

/// Scenario 2: two replicas concurrently move the same node (`b3`) to two
/// different destinations. The move with the larger timestamp wins on both
/// sides; the loser has no effect anywhere.
#[test]
fn concurrent_move_of_the_same_node() {
    let (mut r_a, mut r_b) = seeded_pair();

    // Moves b3 under a, after a1 (t=50, the later move).
    let move_to_a = Operation::move_node(50, NodeId::from("b3"), NodeId::from("a"), 0.28);
    // Moves b3 to the head of b (t=30, the earlier move).
    let move_to_b_head = Operation::move_node(30, NodeId::from("b3"), NodeId::from("b"), 0.04);

    r_a.merge(vec![move_to_a.clone()]);
    r_a.merge(vec![move_to_b_head.clone()]);
    r_b.merge(vec![move_to_b_head]);
    r_b.merge(vec![move_to_a]);

    for tree in [&r_a, &r_b] {
        let b3 = tree.get_node(&NodeId::from("b3")).unwrap();
        assert_eq!(b3.parent_id, NodeId::from("a"));
        assert_eq!(b3.v_pos, 0.28);
    }
}

/// Scenario 3: a remove and a later move target the same node. The move's
/// timestamp exceeds the remove's, so the node ends up live at its new
/// location on both replicas.
#[test]
fn move_wins_over_an_older_remove() {
    let (mut r_a, mut r_b) = seeded_pair();

    let remove_a2 = Operation::remove(20, NodeId::from("a2"));
    let move_a2_to_b = Operation::move_node(21, NodeId::from("a2"), NodeId::from("b"), 0.04);

    r_a.merge(vec![remove_a2.clone(), move_a2_to_b.clone()]);
    r_b.merge(vec![move_a2_to_b, remove_a2]);

    for tree in [&r_a, &r_b] {
        let a2 = tree.get_node(&NodeId::from("a2")).unwrap();
        assert!(!a2.is_tombstone());
        assert_eq!(a2.parent_id, NodeId::from("b"));
    }
}

/// Scenario 4: a remove and an unrelated insert are merged in opposite
/// orders by two replicas. Final state is identical either way.
#[test]
fn remove_then_insert_merged_in_reverse_order() {
    let (mut r_a, mut r_b) = seeded_pair();

    let ops = vec![
        Operation::remove(30, NodeId::from("a1")),
        Operation::insert(31, NodeId::from("a"), node_at("a3", "a", 31, 0.05)),
    ];
    r_a.merge(ops.clone());

    let mut reversed = ops;
    reversed.reverse();
    r_b.merge(reversed);

    for tree in [&r_a, &r_b] {
        assert!(tree.get_node(&NodeId::from("a1")).unwrap().is_tombstone());
        assert!(tree.get_node(&NodeId::from("a3")).is_some());
        assert_eq!(siblings(tree, "a"), vec!["a3", "a1", "a2"]);
    }
}

/// Scenario 5: one replica inserts a node right after a reference node that
/// another replica concurrently removes. Both replicas converge to the
/// tombstoned reference with the new node adjacent to it.
#[test]
fn insert_after_a_concurrently_removed_reference() {
    let (mut r_a, mut r_b) = seeded_pair();

    let insert_a3 = Operation::insert(40, NodeId::from("a"), node_at("a3", "a", 40, 0.28));
    let remove_a1 = Operation::remove(41, NodeId::from("a1"));

    r_a.merge(vec![insert_a3.clone()]);
    r_a.merge(vec![remove_a1.clone()]);
    r_b.merge(vec![remove_a1]);
    r_b.merge(vec![insert_a3]);

    for tree in [&r_a, &r_b] {
        assert!(tree.get_node(&NodeId::from("a1")).unwrap().is_tombstone());
        assert_eq!(siblings(tree, "a"), vec!["a1", "a3", "a2"]);
    }
}

/// Scenario 6: duplicate delivery, any of the preceding scenarios'
/// combined logs merged twice (or concatenated with itself in either
/// order) converges to the same state as merging it once.
#[test]
fn duplicate_delivery_of_a_combined_log_still_converges() {
    let mut combined = fixture();
    combined.push(Operation::insert(9, NodeId::from("a"), node_at("a3", "a", 9, 0.64)));
    combined.push(Operation::remove(20, NodeId::from("b1")));
    combined.push(Operation::move_node(25, NodeId::from("b2"), NodeId::root(), 0.9));

    let mut once = DefaultTreeCrdt::<String>::default();
    once.merge(combined.clone());

    let mut twice = DefaultTreeCrdt::<String>::default();
    twice.merge(combined.clone());
    twice.merge(combined.clone());

    let mut doubled_concat = DefaultTreeCrdt::<String>::default();
    let mut doubled = combined.clone();
    doubled.extend(combined);
    doubled_concat.merge(doubled);

    assert_eq!(siblings(&once, "a"), siblings(&twice, "a"));
    assert_eq!(siblings(&once, "a"), siblings(&doubled_concat, "a"));
    assert_eq!(once.get_nodes().count(), twice.get_nodes().count());
    assert_eq!(once.get_nodes().count(), doubled_concat.get_nodes().count());
}
