//! A standalone, human-readable bench report — complements the criterion
//! harness in `benches/core.rs` for a quick wall-clock-stamped summary.

use std::time::Instant;

use treecrdt::{DefaultTreeCrdt, Node, NodeId};

fn main() {
    println!("treecrdt bench report — {}", chrono::Utc::now().to_rfc3339());

    let n = 5_000;

    let start = Instant::now();
    let mut tree = DefaultTreeCrdt::<String>::default();
    for i in 0..n {
        let id = NodeId::from(format!("n{i}"));
        tree.insert(NodeId::root(), NodeId::root(), Node::new(id, NodeId::root(), 0, 0.5))
            .expect("insert");
    }
    println!("insert {n} siblings: {:?}", start.elapsed());

    let ops = tree.log().entries().to_vec();
    let start = Instant::now();
    let mut dest = DefaultTreeCrdt::<String>::default();
    dest.merge(ops);
    println!("merge {n} inserts into a fresh replica: {:?}", start.elapsed());

    let ids: Vec<NodeId> = tree.get_nodes().map(|node| node.id.clone()).collect();
    for id in ids {
        tree.remove(id).expect("remove");
    }
    let start = Instant::now();
    let purged = tree.purge(0);
    println!("purge {} tombstones: {:?}", purged.len(), start.elapsed());
}
