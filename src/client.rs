//! The store-client seam the facade is built over.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::batch::BatchOperation;
use crate::error::Result;
use crate::query::QuerySpec;

/// Primitive operations a document store must supply.
///
/// Implementations return raw `(id, fields)` pairs; identifier
/// normalization happens in the facade. The contract mirrors the store
/// side of every facade operation:
///
/// - `update` fails with [`crate::Error::NotFound`] when the target is
///   absent, while `merge` creates-or-merges.
/// - `remove` is idempotent.
/// - `execute` applies conditions conjunctively (order-independent),
///   sorts after filtering, and truncates last.
/// - `commit` applies its operations as a single atomic unit.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Insert with a store-generated identifier, returning it.
    async fn insert(&self, collection: &str, data: Map<String, Value>) -> Result<String>;

    /// Create-or-merge at a caller-chosen identifier.
    async fn merge(&self, collection: &str, id: &str, data: Map<String, Value>) -> Result<()>;

    /// Read one document; `None` when absent.
    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<Map<String, Value>>>;

    /// Read every document in a collection; empty for an unknown one.
    async fn fetch_all(&self, collection: &str) -> Result<Vec<(String, Map<String, Value>)>>;

    /// Partially update an existing document.
    async fn update(&self, collection: &str, id: &str, data: Map<String, Value>) -> Result<()>;

    /// Delete by identifier; succeeds whether or not it exists.
    async fn remove(&self, collection: &str, id: &str) -> Result<()>;

    /// Run a filtered/sorted/limited query.
    async fn execute(&self, spec: QuerySpec) -> Result<Vec<(String, Map<String, Value>)>>;

    /// Apply a batch atomically: all operations become visible
    /// together, or none are applied.
    async fn commit(&self, operations: Vec<BatchOperation>) -> Result<()>;
}
