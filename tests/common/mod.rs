#![allow(dead_code)]

use treecrdt::{DefaultTreeCrdt, Node, NodeId};

pub type TestTree = DefaultTreeCrdt<String>;

pub fn new_tree() -> TestTree {
    TestTree::default()
}

pub fn leaf(id: &str, parent: &str) -> Node<String, u64> {
    Node::new(NodeId::from(id), NodeId::from(parent), 0, 0.5)
}

pub fn node_at(id: &str, parent: &str, t: u64, v_pos: f64) -> Node<String, u64> {
    Node::new(NodeId::from(id), NodeId::from(parent), t, v_pos)
}
