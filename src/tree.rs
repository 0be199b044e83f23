//! The replica facade: local mutators, the merge engine, flat-list
//! construction, tombstone purge, and the read-only query surface.
//!
//! `TreeCrdt<V, C, L, Q>` is generic over the per-node value type `V`, the
//! host-supplied [`Clock`] `C`, and the two host-pluggable collaborators
//! (the [`OperationLog`] `L` and the [`DeferredQueue`] `Q`). [`DefaultTreeCrdt`]
//! fixes `C`, `L`, and `Q` to their in-memory defaults for callers who don't
//! need to supply their own.

use std::collections::HashMap;

use crate::clock::{Clock, LogicalClock};
use crate::deferred::{DeferredQueue, MemoryDeferredQueue};
use crate::error::{Error, Result};
use crate::ids::NodeId;
use crate::log::{MemoryLog, OperationLog};
use crate::node::{Node, TimestampedValue, Value};
use crate::ops::{Operation, OperationKind};
use crate::position::{allocate_v_pos, JitterSource, RandomJitter};
use crate::store::NodeStore;

/// A single replica: its node store, its timestamp source, and its two
/// outbound collaborators (operation log, deferred queue).
pub struct TreeCrdt<V, C, L, Q>
where
    C: Clock,
{
    store: NodeStore<V, C::Time>,
    clock: C,
    log: L,
    deferred: Q,
    jitter: Box<dyn JitterSource>,
}

/// A `TreeCrdt` with every host collaborator fixed to its in-memory
/// default: a monotonic counter clock, a `Vec`-backed log, and a
/// `SortedMultiMap`-backed deferred queue.
pub type DefaultTreeCrdt<V> = TreeCrdt<V, LogicalClock, MemoryLog<V, u64>, MemoryDeferredQueue<V, u64>>;

impl<V: Value> Default for DefaultTreeCrdt<V> {
    fn default() -> Self {
        TreeCrdt::new(LogicalClock::default(), MemoryLog::new(), MemoryDeferredQueue::new())
    }
}

impl<V, C, L, Q> TreeCrdt<V, C, L, Q>
where
    V: Value,
    C: Clock,
    L: OperationLog<V, C::Time>,
    Q: DeferredQueue<V, C::Time>,
{
    /// A fresh, empty replica (just the root sentinel) using the default
    /// non-deterministic jitter source.
    pub fn new(clock: C, log: L, deferred: Q) -> Self {
        Self::with_jitter(clock, log, deferred, Box::new(RandomJitter::default()))
    }

    /// Like [`TreeCrdt::new`], but with an injectable jitter source —
    /// tests want a deterministic one.
    pub fn with_jitter(clock: C, log: L, deferred: Q, jitter: Box<dyn JitterSource>) -> Self {
        Self {
            store: NodeStore::new(),
            clock,
            log,
            deferred,
            jitter,
        }
    }

    /// Rebuild a replica from a flat, unordered node list. The order of
    /// `nodes` has no effect on the resulting tree: each index is
    /// content-addressed by id and parent. Nodes with the root id are
    /// ignored — the root sentinel is implicit and never stored directly.
    pub fn from_nodes(nodes: Vec<Node<V, C::Time>>, clock: C, log: L, deferred: Q) -> Self {
        Self::from_nodes_with_jitter(nodes, clock, log, deferred, Box::new(RandomJitter::default()))
    }

    pub fn from_nodes_with_jitter(
        nodes: Vec<Node<V, C::Time>>,
        clock: C,
        log: L,
        deferred: Q,
        jitter: Box<dyn JitterSource>,
    ) -> Self {
        let mut tree = Self::with_jitter(clock, log, deferred, jitter);
        for node in nodes {
            if node.id.is_root() {
                continue;
            }
            let parent_id = node.parent_id.clone();
            tree.store.add_node(node, parent_id);
        }
        tree
    }

    fn allocate_position(&mut self, parent_id: &NodeId, ref_id: &NodeId) -> f64 {
        let siblings = self.store.children_of(parent_id);
        let target_idx = if ref_id.is_root() {
            0
        } else {
            siblings
                .iter()
                .position(|id| id == ref_id)
                .map(|i| i + 1)
                .unwrap_or(siblings.len())
        };
        let prev = if target_idx == 0 {
            None
        } else {
            self.store.get(&siblings[target_idx - 1]).map(|n| n.v_pos)
        };
        let next = siblings.get(target_idx).and_then(|id| self.store.get(id)).map(|n| n.v_pos);
        allocate_v_pos(prev, next, self.jitter.as_mut())
    }

    /// The id that currently immediately precedes `node_id` in `parent_id`'s
    /// sibling list, or the root id if `node_id` is head (or absent there).
    fn predecessor_of(&self, parent_id: &NodeId, node_id: &NodeId) -> NodeId {
        let siblings = self.store.children_of(parent_id);
        match siblings.iter().position(|id| id == node_id) {
            Some(0) | None => NodeId::root(),
            Some(idx) => siblings[idx - 1].clone(),
        }
    }

    // ---- local mutators -------------------------------------------------

    /// Insert `payload` as a new child of `parent_id`, immediately after
    /// `ref_id` (the root id means "at head"). Fails without mutating state
    /// if `parent_id` doesn't exist, `ref_id` isn't a child of `parent_id`,
    /// or `payload.id` is already in use.
    pub fn insert(&mut self, parent_id: NodeId, ref_id: NodeId, mut payload: Node<V, C::Time>) -> Result<()> {
        if !self.store.contains(&parent_id) {
            return Err(Error::UnmetPreconditions(format!(
                "parent {parent_id} does not exist"
            )));
        }
        if !ref_id.is_root() && self.store.parent_of(&ref_id) != Some(&parent_id) {
            return Err(Error::UnmetPreconditions(format!(
                "ref {ref_id} is not a child of {parent_id}"
            )));
        }
        if self.store.contains(&payload.id) {
            return Err(Error::UnmetPreconditions(format!(
                "id {} is already in use",
                payload.id
            )));
        }

        let t = self.clock.get_time();
        let v_pos = self.allocate_position(&parent_id, &ref_id);
        payload.t = t;
        payload.v_pos = v_pos;
        payload.parent_id = parent_id.clone();
        payload.removed = None;

        self.store.add_node(payload.clone(), parent_id.clone());
        self.log.push(Operation::insert(t, parent_id, payload));
        Ok(())
    }

    /// Move `node_id` to become a child of `parent_id`, immediately after
    /// `ref_id`. Fails without mutating state if `node_id` doesn't exist,
    /// `ref_id` isn't a child of `parent_id`, or the move would place
    /// `node_id` into the exact slot it already occupies.
    pub fn move_node(&mut self, node_id: NodeId, parent_id: NodeId, ref_id: NodeId) -> Result<()> {
        if self.store.get(&node_id).is_none() {
            return Err(Error::UnmetPreconditions(format!(
                "node {node_id} does not exist"
            )));
        }
        if !ref_id.is_root() && self.store.parent_of(&ref_id) != Some(&parent_id) {
            return Err(Error::UnmetPreconditions(format!(
                "ref {ref_id} is not a child of {parent_id}"
            )));
        }
        let current_parent = self.store.parent_of(&node_id).cloned();
        if current_parent.as_ref() == Some(&parent_id) && self.predecessor_of(&parent_id, &node_id) == ref_id {
            return Err(Error::UnmetPreconditions(format!(
                "move of {node_id} would be a no-op"
            )));
        }

        let t = self.clock.get_time();
        let v_pos = self.allocate_position(&parent_id, &ref_id);
        self.store.unset_parent(&node_id);
        {
            let node = self.store.get_mut(&node_id).expect("existence checked above");
            node.parent_id = parent_id.clone();
            node.t = t;
            node.v_pos = v_pos;
            node.removed = None;
        }
        self.store.set_parent(&node_id, parent_id.clone());
        self.log.push(Operation::move_node(t, node_id, parent_id, v_pos));
        Ok(())
    }

    /// Tombstone `node_id`. A no-op (no log entry, no mutation) if it's
    /// already a tombstone.
    pub fn remove(&mut self, node_id: NodeId) -> Result<()> {
        let node = self
            .store
            .get(&node_id)
            .ok_or_else(|| Error::UnmetPreconditions(format!("node {node_id} does not exist")))?;
        if node.is_tombstone() {
            return Ok(());
        }
        let t = self.clock.get_time();
        self.store.get_mut(&node_id).expect("existence checked above").removed = Some(t);
        self.log.push(Operation::remove(t, node_id));
        Ok(())
    }

    /// Set `key` on `node_id` to `value`, stamped with a fresh timestamp.
    pub fn set_value(&mut self, node_id: NodeId, key: String, value: V) -> Result<()> {
        if self.store.get(&node_id).is_none() {
            return Err(Error::UnmetPreconditions(format!(
                "node {node_id} does not exist"
            )));
        }
        let t = self.clock.get_time();
        self.store
            .get_mut(&node_id)
            .expect("existence checked above")
            .data
            .insert(key.clone(), TimestampedValue::new(value.clone(), t));
        self.log.push(Operation::set_value(t, node_id, key, value));
        Ok(())
    }

    // ---- merge engine -----------------------------------------------

    /// Merge a batch of remote operations, in order. Never fails: every
    /// inconsistency this can encounter resolves silently (parked,
    /// dropped, or applied).
    pub fn merge(&mut self, ops: Vec<Operation<V, C::Time>>) {
        for op in ops {
            self.merge_one(op);
        }
    }

    fn merge_one(&mut self, op: Operation<V, C::Time>) {
        let t = op.t;
        match op.kind {
            OperationKind::Insert { parent_id, node } => self.merge_insert(parent_id, node),
            OperationKind::Move {
                node_id,
                parent_id,
                v_pos,
            } => self.merge_move(t, node_id, parent_id, v_pos),
            OperationKind::Remove { node_id } => self.merge_remove(t, node_id),
            OperationKind::SetValue { node_id, key, value } => self.merge_set_value(t, node_id, key, value),
        }
    }

    fn merge_insert(&mut self, parent_id: NodeId, mut node: Node<V, C::Time>) {
        let node_id = node.id.clone();
        if self.store.get(&node_id).is_some() {
            return; // idempotent: already present
        }
        node.parent_id = parent_id.clone();
        self.store.add_node(node, parent_id);

        let parked = self.deferred.pop(&node_id);
        self.merge(parked);
    }

    fn merge_move(&mut self, t: C::Time, node_id: NodeId, parent_id: NodeId, v_pos: f64) {
        let Some(node) = self.store.get(&node_id) else {
            self.deferred
                .set(node_id.clone(), Operation::move_node(t, node_id, parent_id, v_pos));
            return;
        };
        if node.t > t {
            return; // a newer structural change supersedes this move
        }

        self.store.unset_parent(&node_id);
        {
            let node = self.store.get_mut(&node_id).expect("checked above");
            node.v_pos = v_pos;
            node.t = t;
            if let Some(removed_t) = node.removed {
                if removed_t < t {
                    node.removed = None;
                }
            }
        }
        self.store.set_parent(&node_id, parent_id);
    }

    fn merge_remove(&mut self, t: C::Time, node_id: NodeId) {
        let Some(node) = self.store.get(&node_id) else {
            self.deferred.set(node_id.clone(), Operation::remove(t, node_id));
            return;
        };
        if node.t > t {
            return; // a newer move/insert supersedes this remove
        }
        if let Some(removed_t) = node.removed {
            if removed_t > t {
                return; // a newer remove already recorded
            }
        }
        self.store.get_mut(&node_id).expect("checked above").removed = Some(t);
    }

    fn merge_set_value(&mut self, t: C::Time, node_id: NodeId, key: String, value: V) {
        let Some(node) = self.store.get(&node_id) else {
            self.deferred
                .set(node_id.clone(), Operation::set_value(t, node_id, key, value));
            return;
        };
        let should_write = match node.data.get(&key) {
            None => true,
            Some(existing) => existing.t < t,
        };
        if should_write {
            self.store
                .get_mut(&node_id)
                .expect("checked above")
                .data
                .insert(key, TimestampedValue::new(value, t));
        }
    }

    // ---- purge ------------------------------------------------------

    /// Physically remove every tombstone at least `min_age` old, across
    /// all three indexes. Does not cascade to descendants.
    pub fn purge(&mut self, min_age: C::Time) -> Vec<NodeId> {
        let now = self.clock.get_time();
        let stale: Vec<NodeId> = self
            .store
            .iter()
            .filter_map(|n| n.removed.map(|removed| (n.id.clone(), removed)))
            .filter(|(_, removed)| now - *removed >= min_age)
            .map(|(id, _)| id)
            .collect();
        for id in &stale {
            self.store.remove_node(id);
        }
        stale
    }

    // ---- query surface ------------------------------------------------

    pub fn get_node(&self, node_id: &NodeId) -> Option<&Node<V, C::Time>> {
        self.store.get(node_id)
    }

    /// Every node, in the order it was first added to this replica.
    pub fn get_nodes(&self) -> impl Iterator<Item = &Node<V, C::Time>> {
        self.store.iter()
    }

    /// A flattened `key -> value` view of a node's data, stripped of
    /// timestamps. `None` if the node doesn't exist.
    pub fn get_data(&self, node_id: &NodeId) -> Option<HashMap<String, V>> {
        self.store
            .get(node_id)
            .map(|n| n.data.iter().map(|(k, tv)| (k.clone(), tv.value.clone())).collect())
    }

    /// `None` if either the node or the key is absent; the two cases are
    /// not distinguished.
    pub fn get_value(&self, node_id: &NodeId, key: &str) -> Option<&V> {
        self.store.get(node_id)?.data.get(key).map(|tv| &tv.value)
    }

    /// The sorted sibling id list under `node_id` (the root id included).
    pub fn child_list(&self, node_id: &NodeId) -> &[NodeId] {
        self.store.children_of(node_id)
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn deferred_queue(&self) -> &Q {
        &self.deferred
    }
}
