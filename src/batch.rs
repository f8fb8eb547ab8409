//! Atomic multi-document write batches.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One member of an atomic write batch.
///
/// `Set` merges into (or creates) the target document; `Update` merges
/// into an existing document and rejects the whole batch when the
/// target is absent; `Delete` removes the target and succeeds whether
/// or not it exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum BatchOperation {
    Set {
        collection: String,
        id: String,
        data: Map<String, Value>,
    },
    Update {
        collection: String,
        id: String,
        data: Map<String, Value>,
    },
    Delete {
        collection: String,
        id: String,
    },
}

impl BatchOperation {
    pub fn collection(&self) -> &str {
        match self {
            Self::Set { collection, .. }
            | Self::Update { collection, .. }
            | Self::Delete { collection, .. } => collection,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Set { id, .. } | Self::Update { id, .. } | Self::Delete { id, .. } => id,
        }
    }
}

/// Builder accumulating an ordered sequence of batch operations.
///
/// # Example
/// ```
/// use acorndb::WriteBatch;
/// use serde_json::json;
///
/// let ops = WriteBatch::new()
///     .set("products", "prod-1", json!({"price": 10}))
///     .update("products", "prod-2", json!({"in_stock": false}))
///     .delete("products", "prod-3")
///     .into_operations();
/// assert_eq!(ops.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    operations: Vec<BatchOperation>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a merge-upsert at a caller-chosen identifier.
    pub fn set(mut self, collection: impl Into<String>, id: impl Into<String>, data: Value) -> Self {
        self.operations.push(BatchOperation::Set {
            collection: collection.into(),
            id: id.into(),
            data: into_object(data),
        });
        self
    }

    /// Queue a partial update of an existing document.
    pub fn update(
        mut self,
        collection: impl Into<String>,
        id: impl Into<String>,
        data: Value,
    ) -> Self {
        self.operations.push(BatchOperation::Update {
            collection: collection.into(),
            id: id.into(),
            data: into_object(data),
        });
        self
    }

    /// Queue a delete.
    pub fn delete(mut self, collection: impl Into<String>, id: impl Into<String>) -> Self {
        self.operations.push(BatchOperation::Delete {
            collection: collection.into(),
            id: id.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn into_operations(self) -> Vec<BatchOperation> {
        self.operations
    }
}

/// Coerce write data to a field map; non-object values become a map
/// with a single `"value"` entry.
pub(crate) fn into_object(data: Value) -> Map<String, Value> {
    match data {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_preserves_order() {
        let ops = WriteBatch::new()
            .set("a", "1", json!({"x": 1}))
            .delete("a", "2")
            .update("b", "3", json!({"y": 2}))
            .into_operations();

        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[0], BatchOperation::Set { .. }));
        assert!(matches!(ops[1], BatchOperation::Delete { .. }));
        assert_eq!(ops[2].collection(), "b");
        assert_eq!(ops[2].id(), "3");
    }

    #[test]
    fn test_operation_serde_tag() {
        let op = BatchOperation::Delete {
            collection: "users".to_string(),
            id: "u1".to_string(),
        };
        let v = serde_json::to_value(&op).unwrap();
        assert_eq!(v["op"], "delete");
        assert_eq!(v["collection"], "users");
    }
}
