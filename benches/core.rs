use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use treecrdt::{DefaultTreeCrdt, Node, NodeId};

fn seeded_siblings(n: usize) -> DefaultTreeCrdt<String> {
    let mut tree = DefaultTreeCrdt::<String>::default();
    for i in 0..n {
        let id = NodeId::from(format!("n{i}"));
        tree.insert(NodeId::root(), NodeId::root(), Node::new(id, NodeId::root(), 0, 0.5))
            .unwrap();
    }
    tree
}

fn insert_siblings(c: &mut Criterion) {
    c.bench_function("insert 1000 siblings under root", |b| {
        b.iter(|| seeded_siblings(1000));
    });
}

fn merge_remote_log(c: &mut Criterion) {
    c.bench_function("merge 1000 inserts from a remote log", |b| {
        b.iter_batched(
            || seeded_siblings(1000).log().entries().to_vec(),
            |ops| {
                let mut dest = DefaultTreeCrdt::<String>::default();
                dest.merge(ops);
            },
            BatchSize::LargeInput,
        );
    });
}

fn purge_tombstones(c: &mut Criterion) {
    c.bench_function("purge 1000 tombstones", |b| {
        b.iter_batched(
            || {
                let mut tree = seeded_siblings(1000);
                let ids: Vec<NodeId> = tree.get_nodes().map(|node| node.id.clone()).collect();
                for id in ids {
                    tree.remove(id).unwrap();
                }
                tree
            },
            |mut tree| {
                tree.purge(0);
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, insert_siblings, merge_remote_log, purge_tombstones);
criterion_main!(benches);
