//! Bridges [`Operation`] to and from the historical `[name, t, details]`
//! array form. This is the one boundary where an unrecognized operation
//! name can appear — an unknown `name` tag at decode time is the only
//! place [`Error::UnknownOperation`] is raised, since the in-process
//! [`OperationKind`] enum is closed and can't itself hold a variant the
//! engine doesn't know about.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::ids::NodeId;
use crate::node::Node;
use crate::ops::{Operation, OperationKind};

#[derive(Serialize, Deserialize)]
struct InsertDetails<V, T> {
    parent_id: NodeId,
    node: Node<V, T>,
}

#[derive(Serialize, Deserialize)]
struct MoveDetails {
    node_id: NodeId,
    parent_id: NodeId,
    v_pos: f64,
}

#[derive(Serialize, Deserialize)]
struct RemoveDetails {
    node_id: NodeId,
}

#[derive(Serialize, Deserialize)]
struct SetValueDetails<V> {
    node_id: NodeId,
    key: String,
    value: V,
}

/// Encode an operation as the exact three-element `[name, t, details]`
/// array the wire format specifies.
pub fn encode<V, T>(op: &Operation<V, T>) -> Result<Json>
where
    V: Serialize + Clone,
    T: Serialize + Clone,
{
    let to_json = |v: &T| serde_json::to_value(v).map_err(|e| Error::UnknownOperation(e.to_string()));
    let details = match &op.kind {
        OperationKind::Insert { parent_id, node } => serde_json::to_value(InsertDetails {
            parent_id: parent_id.clone(),
            node: node.clone(),
        }),
        OperationKind::Move {
            node_id,
            parent_id,
            v_pos,
        } => serde_json::to_value(MoveDetails {
            node_id: node_id.clone(),
            parent_id: parent_id.clone(),
            v_pos: *v_pos,
        }),
        OperationKind::Remove { node_id } => serde_json::to_value(RemoveDetails {
            node_id: node_id.clone(),
        }),
        OperationKind::SetValue {
            node_id,
            key,
            value,
        } => serde_json::to_value(SetValueDetails {
            node_id: node_id.clone(),
            key: key.clone(),
            value: value.clone(),
        }),
    }
    .map_err(|e| Error::UnknownOperation(e.to_string()))?;

    Ok(Json::Array(vec![
        Json::String(op.name().to_string()),
        to_json(&op.t)?,
        details,
    ]))
}

/// Decode an operation from its `[name, t, details]` array form. Returns
/// [`Error::UnknownOperation`] if `name` is not one of the four recognized
/// tags — a protocol mismatch between sender and receiver.
pub fn decode<V, T>(record: &Json) -> Result<Operation<V, T>>
where
    V: DeserializeOwned,
    T: DeserializeOwned,
{
    let arr = record
        .as_array()
        .filter(|a| a.len() == 3)
        .ok_or_else(|| Error::UnknownOperation("malformed operation record".into()))?;

    let name = arr[0]
        .as_str()
        .ok_or_else(|| Error::UnknownOperation("operation name must be a string".into()))?;
    let t: T = serde_json::from_value(arr[1].clone())
        .map_err(|e| Error::UnknownOperation(e.to_string()))?;
    let details = arr[2].clone();

    let from_json = |e: serde_json::Error| Error::UnknownOperation(e.to_string());

    let kind = match name {
        "insert" => {
            let d: InsertDetails<V, T> = serde_json::from_value(details).map_err(from_json)?;
            OperationKind::Insert {
                parent_id: d.parent_id,
                node: d.node,
            }
        }
        "move" => {
            let d: MoveDetails = serde_json::from_value(details).map_err(from_json)?;
            OperationKind::Move {
                node_id: d.node_id,
                parent_id: d.parent_id,
                v_pos: d.v_pos,
            }
        }
        "remove" => {
            let d: RemoveDetails = serde_json::from_value(details).map_err(from_json)?;
            OperationKind::Remove { node_id: d.node_id }
        }
        "setValue" => {
            let d: SetValueDetails<V> = serde_json::from_value(details).map_err(from_json)?;
            OperationKind::SetValue {
                node_id: d.node_id,
                key: d.key,
                value: d.value,
            }
        }
        other => return Err(Error::UnknownOperation(other.to_string())),
    };

    Ok(Operation { t, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NodeId;

    #[test]
    fn round_trips_insert() {
        let node = Node::<String, u64>::new(NodeId::from("a1"), NodeId::from("a"), 5, 0.4);
        let op = Operation::insert(5u64, NodeId::from("a"), node);
        let json = encode(&op).unwrap();
        assert_eq!(json[0], Json::String("insert".into()));
        let decoded: Operation<String, u64> = decode(&json).unwrap();
        assert_eq!(decoded, op);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let json = serde_json::json!(["rename", 1u64, {}]);
        let result: Result<Operation<String, u64>> = decode(&json);
        assert!(matches!(result, Err(Error::UnknownOperation(_))));
    }
}
