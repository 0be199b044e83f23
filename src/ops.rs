#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::NodeId;
use crate::node::{Node, Timestamp, Value};

/// The four CRDT mutations, carrying only the fields each assigns to its
/// `details` object. Modeled as a closed sum type; `wire` bridges this to
/// the historical `[name, t, details]` array form.
///
/// No `Eq` derive: `Move`'s `v_pos` is an `f64`, which has no total equality.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(bound(serialize = "V: Serialize, T: Serialize"))
)]
#[cfg_attr(feature = "serde", serde(bound(deserialize = "V: Deserialize<'de>, T: Deserialize<'de>")))]
pub enum OperationKind<V, T> {
    Insert {
        parent_id: NodeId,
        node: Node<V, T>,
    },
    Move {
        node_id: NodeId,
        parent_id: NodeId,
        v_pos: f64,
    },
    Remove {
        node_id: NodeId,
    },
    SetValue {
        node_id: NodeId,
        key: String,
        value: V,
    },
}

impl<V, T> OperationKind<V, T> {
    /// The wire/log name for this operation.
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Insert { .. } => "insert",
            OperationKind::Move { .. } => "move",
            OperationKind::Remove { .. } => "remove",
            OperationKind::SetValue { .. } => "setValue",
        }
    }
}

/// A logged or wire operation: `[name, t, details]`, modeled as a struct
/// wrapping the closed `OperationKind` sum type.
///
/// No `Eq` derive: transitively holds an `f64` through `kind`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(bound(serialize = "V: Serialize, T: Serialize"))
)]
#[cfg_attr(feature = "serde", serde(bound(deserialize = "V: Deserialize<'de>, T: Deserialize<'de>")))]
pub struct Operation<V, T> {
    pub t: T,
    pub kind: OperationKind<V, T>,
}

impl<V: Value, T: Timestamp> Operation<V, T> {
    pub fn insert(t: T, parent_id: NodeId, node: Node<V, T>) -> Self {
        Self {
            t,
            kind: OperationKind::Insert { parent_id, node },
        }
    }

    pub fn move_node(t: T, node_id: NodeId, parent_id: NodeId, v_pos: f64) -> Self {
        Self {
            t,
            kind: OperationKind::Move {
                node_id,
                parent_id,
                v_pos,
            },
        }
    }

    pub fn remove(t: T, node_id: NodeId) -> Self {
        Self {
            t,
            kind: OperationKind::Remove { node_id },
        }
    }

    pub fn set_value(t: T, node_id: NodeId, key: String, value: V) -> Self {
        Self {
            t,
            kind: OperationKind::SetValue {
                node_id,
                key,
                value,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}
