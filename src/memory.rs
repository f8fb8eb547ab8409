//! In-process store client.
//!
//! Backs tests and local development with the same contract the hosted
//! store provides: conjunctive filtering, sort-after-filter, truncate
//! last, and atomic batch commit.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::batch::BatchOperation;
use crate::client::StoreClient;
use crate::error::{Error, Result};
use crate::query::{Condition, FieldOp, QuerySpec, SortDirection};

type Fields = Map<String, Value>;
type Collections = HashMap<String, HashMap<String, Fields>>;

/// In-memory document store.
#[derive(Default)]
pub struct MemoryClient {
    collections: RwLock<Collections>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Top-level merge of `data` into `target`; fields absent from `data`
/// survive.
fn merge_fields(target: &mut Fields, data: Fields) {
    for (key, value) in data {
        target.insert(key, value);
    }
}

/// Comparisons are defined between like-typed values only; numbers
/// compare as f64, booleans order false before true.
fn value_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// A condition on a missing field never matches, `!=` and `not-in`
/// included.
fn matches_condition(fields: &Fields, condition: &Condition) -> bool {
    let actual = match fields.get(&condition.field) {
        Some(value) => value,
        None => return false,
    };

    match condition.op {
        FieldOp::Eq => actual == &condition.value,
        FieldOp::Ne => actual != &condition.value,
        FieldOp::Lt => value_cmp(actual, &condition.value) == Some(Ordering::Less),
        FieldOp::Lte => matches!(
            value_cmp(actual, &condition.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FieldOp::Gt => value_cmp(actual, &condition.value) == Some(Ordering::Greater),
        FieldOp::Gte => matches!(
            value_cmp(actual, &condition.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FieldOp::ArrayContains => actual
            .as_array()
            .is_some_and(|items| items.contains(&condition.value)),
        FieldOp::ArrayContainsAny => match (actual.as_array(), condition.value.as_array()) {
            (Some(items), Some(wanted)) => items.iter().any(|item| wanted.contains(item)),
            _ => false,
        },
        FieldOp::In => condition
            .value
            .as_array()
            .is_some_and(|wanted| wanted.contains(actual)),
        FieldOp::NotIn => condition
            .value
            .as_array()
            .is_some_and(|wanted| !wanted.contains(actual)),
    }
}

/// Total order for sorting: missing fields sort first ascending,
/// incomparable pairs keep their relative order.
fn sort_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => value_cmp(x, y).unwrap_or(Ordering::Equal),
    }
}

/// Apply one batch operation to a staged copy of the store.
fn apply_operation(staged: &mut Collections, operation: &BatchOperation) -> Result<()> {
    match operation {
        BatchOperation::Set { collection, id, data } => {
            let docs = staged.entry(collection.clone()).or_default();
            let target = docs.entry(id.clone()).or_default();
            merge_fields(target, data.clone());
            Ok(())
        }
        BatchOperation::Update { collection, id, data } => {
            let target = staged
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| Error::NotFound {
                    collection: collection.clone(),
                    id: id.clone(),
                })?;
            merge_fields(target, data.clone());
            Ok(())
        }
        BatchOperation::Delete { collection, id } => {
            if let Some(docs) = staged.get_mut(collection) {
                docs.remove(id);
            }
            Ok(())
        }
    }
}

#[async_trait]
impl StoreClient for MemoryClient {
    async fn insert(&self, collection: &str, data: Fields) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut collections = self.collections.write();
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn merge(&self, collection: &str, id: &str, data: Fields) -> Result<()> {
        let mut collections = self.collections.write();
        let target = collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default();
        merge_fields(target, data);
        Ok(())
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<Fields>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<(String, Fields)>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| (id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(&self, collection: &str, id: &str, data: Fields) -> Result<()> {
        let mut collections = self.collections.write();
        let target = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| Error::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        merge_fields(target, data);
        Ok(())
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.write();
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn execute(&self, spec: QuerySpec) -> Result<Vec<(String, Fields)>> {
        let collections = self.collections.read();
        let mut results: Vec<(String, Fields)> = collections
            .get(&spec.collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| {
                        spec.conditions
                            .iter()
                            .all(|condition| matches_condition(fields, condition))
                    })
                    .map(|(id, fields)| (id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();
        drop(collections);

        if let Some(sort) = &spec.sort {
            results.sort_by(|(_, a), (_, b)| {
                let ordering = sort_cmp(a.get(&sort.field), b.get(&sort.field));
                match sort.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = spec.limit {
            results.truncate(limit);
        }

        Ok(results)
    }

    async fn commit(&self, operations: Vec<BatchOperation>) -> Result<()> {
        let mut collections = self.collections.write();
        // Stage against a copy; later operations observe earlier ones.
        let mut staged = collections.clone();
        for operation in &operations {
            apply_operation(&mut staged, operation)?;
        }
        *collections = staged;
        debug!(operations = operations.len(), "batch committed");
        Ok(())
    }
}
