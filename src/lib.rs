//! Operation-based CRDT for a rooted, ordered, labeled tree, built for
//! peer-to-peer, offline-capable collaborative editing. A replica mutates
//! locally through four operations (`insert`, `move`, `remove`,
//! `set_value`), appends them to a log, and merges logs received from
//! other replicas. Any two replicas that have merged the same set of
//! operations converge to the same observable tree, regardless of
//! delivery order, duplication, or concurrent interleaving.
//!
//! The engine itself never touches the network, a disk, or a clock beyond
//! the [`Clock`](clock::Clock) trait a host supplies — transport,
//! persistence, id generation, and clock synchronization are all host
//! responsibilities.

#![forbid(unsafe_code)]

pub mod clock;
pub mod deferred;
pub mod error;
pub mod ids;
pub mod log;
pub mod multimap;
pub mod node;
pub mod ops;
pub mod position;
pub mod store;
pub mod tree;

#[cfg(feature = "serde")]
pub mod wire;

pub use clock::{Clock, LogicalClock};
#[cfg(feature = "chrono")]
pub use clock::SystemClock;
pub use deferred::{DeferredQueue, MemoryDeferredQueue};
pub use error::{Error, Result};
pub use ids::NodeId;
pub use log::{MemoryLog, OperationLog};
pub use multimap::SortedMultiMap;
pub use node::{Node, Timestamp, TimestampedValue, Value};
pub use ops::{Operation, OperationKind};
pub use position::{allocate_v_pos, FixedJitter, JitterSource, RandomJitter, SeededJitter};
pub use store::NodeStore;
pub use tree::{DefaultTreeCrdt, TreeCrdt};
