//! A parking lot for remote operations whose referenced node has not yet
//! arrived. No priority ordering among parked records is required;
//! correctness comes entirely from each merge handler's own staleness
//! checks when a record is drained and replayed through `merge`.

use crate::ids::NodeId;
use crate::multimap::SortedMultiMap;
use crate::node::{Timestamp, Value};
use crate::ops::Operation;

/// A deferred-operation store, keyed by the node id whose absence caused
/// an operation to park.
pub trait DeferredQueue<V, T> {
    fn set(&mut self, node_id: NodeId, op: Operation<V, T>);
    fn pop(&mut self, node_id: &NodeId) -> Vec<Operation<V, T>>;
}

/// The default in-memory deferred queue, backed by
/// [`SortedMultiMap`] with no comparator (insertion order only).
#[derive(Clone, Debug, Default)]
pub struct MemoryDeferredQueue<V, T> {
    parked: SortedMultiMap<NodeId, Operation<V, T>>,
}

impl<V: Value, T: Timestamp> MemoryDeferredQueue<V, T> {
    pub fn new() -> Self {
        Self {
            parked: SortedMultiMap::new(),
        }
    }
}

impl<V: Value, T: Timestamp> DeferredQueue<V, T> for MemoryDeferredQueue<V, T> {
    fn set(&mut self, node_id: NodeId, op: Operation<V, T>) {
        self.parked.push(node_id, op);
    }

    fn pop(&mut self, node_id: &NodeId) -> Vec<Operation<V, T>> {
        self.parked.drain_all(node_id)
    }
}
