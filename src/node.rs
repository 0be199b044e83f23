use std::collections::HashMap;
use std::ops::Sub;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// App-defined per-key value a host stores on a node. Any cloneable type
/// qualifies; the engine never inspects `V` beyond cloning and equality it
/// gets for free from the host's own type.
pub trait Value: Clone {}
impl<V: Clone> Value for V {}

/// Opaque, totally-ordered timestamp supplied by the host. `Sub` is
/// required only because `purge` needs to compute a tombstone's age; the
/// engine never otherwise inspects a timestamp beyond `<` and `==`.
pub trait Timestamp: Copy + Ord + Sub<Output = Self> {}
impl<T: Copy + Ord + Sub<Output = T>> Timestamp for T {}

/// A single key's value together with the timestamp of the `setValue` that
/// last wrote it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(bound(serialize = "V: Serialize, T: Serialize"))
)]
#[cfg_attr(feature = "serde", serde(bound(deserialize = "V: Deserialize<'de>, T: Deserialize<'de>")))]
pub struct TimestampedValue<V, T> {
    pub value: V,
    pub t: T,
}

impl<V, T> TimestampedValue<V, T> {
    pub fn new(value: V, t: T) -> Self {
        Self { value, t }
    }
}

/// A tree node. `removed` carries the tombstone timestamp when present;
/// `v_pos` is the node's virtual position among its siblings, in the open
/// interval `(0, 1)`.
///
/// No `Eq` derive: `v_pos` is an `f64`, which has no total equality.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(bound(serialize = "V: Serialize, T: Serialize"))
)]
#[cfg_attr(feature = "serde", serde(bound(deserialize = "V: Deserialize<'de>, T: Deserialize<'de>")))]
pub struct Node<V, T> {
    pub id: NodeId,
    pub parent_id: NodeId,
    pub t: T,
    pub v_pos: f64,
    pub removed: Option<T>,
    pub data: HashMap<String, TimestampedValue<V, T>>,
}

impl<V: Value, T: Timestamp> Node<V, T> {
    /// A freshly created, non-tombstoned node with no data.
    pub fn new(id: NodeId, parent_id: NodeId, t: T, v_pos: f64) -> Self {
        Self {
            id,
            parent_id,
            t,
            v_pos,
            removed: None,
            data: HashMap::new(),
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.removed.is_some()
    }
}
