//! Three indexes kept in sync: `id -> node`, `id -> parent_id` (redundant
//! with `node.parent_id`, kept for O(1) lookup and to stay well-defined
//! during the detach/reattach window a `move` passes through), and
//! `parent_id -> sorted child list`.
//!
//! `move` is expressed as [`NodeStore::unset_parent`] followed by
//! reinsertion through [`NodeStore::set_parent`].

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::ids::NodeId;
use crate::multimap::SortedMultiMap;
use crate::node::{Node, Timestamp, Value};

fn compare_siblings<V, T: Timestamp>(
    nodes: &IndexMap<NodeId, Node<V, T>>,
    a: &NodeId,
    b: &NodeId,
) -> Ordering {
    let (a_pos, a_t) = nodes.get(a).map(|n| (n.v_pos, n.t)).unwrap_or((0.0, fallback_t()));
    let (b_pos, b_t) = nodes.get(b).map(|n| (n.v_pos, n.t)).unwrap_or((0.0, fallback_t()));
    a_pos
        .total_cmp(&b_pos)
        .then_with(|| a_t.cmp(&b_t))
}

// Only reachable if a sibling id is missing from `nodes`, which the store
// never allows to happen; exists so `compare_siblings` type-checks without
// an artificial `Default` bound on `T`.
fn fallback_t<T: Timestamp>() -> T {
    unreachable!("sibling id present in child list but absent from node index")
}

/// Three synchronized indexes over the replica's nodes. `nodes` is an
/// `IndexMap` rather than a `HashMap` so that [`NodeStore::iter`] (and
/// therefore `TreeCrdt::get_nodes`) can preserve insertion order.
#[derive(Clone, Debug)]
pub struct NodeStore<V, T> {
    nodes: IndexMap<NodeId, Node<V, T>>,
    parent_index: std::collections::HashMap<NodeId, NodeId>,
    children: SortedMultiMap<NodeId, NodeId>,
}

impl<V, T> Default for NodeStore<V, T> {
    fn default() -> Self {
        Self {
            nodes: IndexMap::new(),
            parent_index: std::collections::HashMap::new(),
            children: SortedMultiMap::new(),
        }
    }
}

impl<V: Value, T: Timestamp> NodeStore<V, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, node_id: &NodeId) -> bool {
        node_id.is_root() || self.nodes.contains_key(node_id)
    }

    pub fn get(&self, node_id: &NodeId) -> Option<&Node<V, T>> {
        self.nodes.get(node_id)
    }

    pub fn get_mut(&mut self, node_id: &NodeId) -> Option<&mut Node<V, T>> {
        self.nodes.get_mut(node_id)
    }

    pub fn parent_of(&self, node_id: &NodeId) -> Option<&NodeId> {
        self.parent_index.get(node_id)
    }

    /// Sorted `(v_pos, t)` order, the tree's ordered sibling view.
    pub fn children_of(&self, parent_id: &NodeId) -> &[NodeId] {
        self.children.get(parent_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node<V, T>> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a brand new node under `parent_id`, placing it into the
    /// parent's sorted sibling list by `(v_pos, t)`.
    pub fn add_node(&mut self, node: Node<V, T>, parent_id: NodeId) {
        let node_id = node.id.clone();
        self.nodes.insert(node_id.clone(), node);
        self.parent_index.insert(node_id.clone(), parent_id.clone());

        let nodes = &self.nodes;
        self.children
            .insert_sorted(parent_id, node_id, move |a, b| compare_siblings(nodes, a, b));
    }

    /// Physically remove a node from all three indexes. The sole
    /// destructive operation in the engine, used only by `purge`.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<Node<V, T>> {
        // `shift_remove`, not `remove` (which is `swap_remove` in this
        // version of indexmap): purge must not disturb the relative
        // insertion order of the nodes left behind.
        let removed = self.nodes.shift_remove(node_id);
        if let Some(parent_id) = self.parent_index.remove(node_id) {
            self.children.remove_one(&parent_id, |child| child == node_id);
        }
        removed
    }

    /// Detach `node_id` from its current parent's sibling list, without
    /// touching `node.parent_id` itself (the caller updates that as part
    /// of the surrounding `move`/`mergeMove` transaction).
    pub fn unset_parent(&mut self, node_id: &NodeId) {
        if let Some(parent_id) = self.parent_index.remove(node_id) {
            self.children.remove_one(&parent_id, |child| child == node_id);
        }
    }

    /// Reattach `node_id` under `parent_id` at the sorted position implied
    /// by its (already-updated) `v_pos`/`t`.
    pub fn set_parent(&mut self, node_id: &NodeId, parent_id: NodeId) {
        self.parent_index.insert(node_id.clone(), parent_id.clone());
        let nodes = &self.nodes;
        self.children.insert_sorted(parent_id, node_id.clone(), move |a, b| {
            compare_siblings(nodes, a, b)
        });
    }
}
