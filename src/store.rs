//! Store-agnostic document CRUD, query, and batch facade.

use std::sync::Arc;

use serde_json::Value;
use tracing::error;

use crate::batch::{into_object, BatchOperation, WriteBatch};
use crate::client::StoreClient;
use crate::config::{validate_name, StoreConfig};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::memory::MemoryClient;
use crate::query::{Condition, QueryOptions, QuerySpec};
use crate::remote::RemoteClient;

/// Uniform CRUD/query/batch interface over any [`StoreClient`].
///
/// The store holds an explicit client handle and nothing else: no
/// document state, no session or cursor state between calls. Failures
/// from the client are logged with operation context and propagated
/// wrapped in the read/write taxonomy; they are never retried or
/// swallowed. Absence is not a failure: a missing document is
/// `Ok(None)` and an empty collection is `Ok(vec![])`.
#[derive(Clone)]
pub struct DocumentStore {
    client: Arc<dyn StoreClient>,
}

impl DocumentStore {
    /// Build a facade over an explicit client handle.
    pub fn new(client: Arc<dyn StoreClient>) -> Self {
        Self { client }
    }

    /// Connect to the hosted store. The trust level is decided by the
    /// credential in `config`; the facade is identical for both.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let client = RemoteClient::connect(config).await?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Facade over a fresh in-process store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryClient::new()))
    }

    /// Add a document with a store-generated identifier, returning it.
    pub async fn add_document(&self, collection: &str, data: Value) -> Result<String> {
        validate_name("collection", collection)?;
        self.client
            .insert(collection, into_object(data))
            .await
            .map_err(|e| write_err("add_document", collection, None, e))
    }

    /// Add or update a document at a caller-chosen identifier.
    ///
    /// Merges with any existing document rather than overwriting
    /// wholesale; fields not present in `data` survive.
    pub async fn set_document(&self, collection: &str, id: &str, data: Value) -> Result<String> {
        validate_name("collection", collection)?;
        validate_name("document id", id)?;
        self.client
            .merge(collection, id, into_object(data))
            .await
            .map_err(|e| write_err("set_document", collection, Some(id), e))?;
        Ok(id.to_string())
    }

    /// Get a document by identifier; `Ok(None)` when it does not exist.
    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        validate_name("collection", collection)?;
        validate_name("document id", id)?;
        let fields = self
            .client
            .fetch(collection, id)
            .await
            .map_err(|e| read_err("get_document", collection, Some(id), e))?;
        Ok(fields.map(|fields| Document::new(id, fields)))
    }

    /// Get every document in a collection; empty for an empty or
    /// unknown collection.
    pub async fn get_all_documents(&self, collection: &str) -> Result<Vec<Document>> {
        validate_name("collection", collection)?;
        let pairs = self
            .client
            .fetch_all(collection)
            .await
            .map_err(|e| read_err("get_all_documents", collection, None, e))?;
        Ok(pairs
            .into_iter()
            .map(|(id, fields)| Document::new(id, fields))
            .collect())
    }

    /// Partially update an existing document. Unlike
    /// [`set_document`](Self::set_document) this fails when the target
    /// does not exist.
    pub async fn update_document(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        validate_name("collection", collection)?;
        validate_name("document id", id)?;
        self.client
            .update(collection, id, into_object(data))
            .await
            .map_err(|e| write_err("update_document", collection, Some(id), e))
    }

    /// Delete a document. Idempotent: deleting an identifier that does
    /// not exist is not an error.
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        validate_name("collection", collection)?;
        validate_name("document id", id)?;
        self.client
            .remove(collection, id)
            .await
            .map_err(|e| write_err("delete_document", collection, Some(id), e))
    }

    /// Query a collection with conjunctive filter conditions.
    ///
    /// An empty condition list degenerates to all documents in the
    /// collection. Sorting applies after the filters; the limit
    /// truncates the ordered result. With a limit but no `order_by`,
    /// which documents survive the cut is store-defined and must be
    /// treated as non-deterministic.
    pub async fn query_documents(
        &self,
        collection: &str,
        conditions: Vec<Condition>,
        options: QueryOptions,
    ) -> Result<Vec<Document>> {
        let spec = QuerySpec::collection(collection)
            .filters(conditions)
            .with_options(options);
        self.query(spec).await
    }

    /// Run a pre-built [`QuerySpec`].
    pub async fn query(&self, spec: QuerySpec) -> Result<Vec<Document>> {
        validate_name("collection", &spec.collection)?;
        let collection = spec.collection.clone();
        let pairs = self
            .client
            .execute(spec)
            .await
            .map_err(|e| read_err("query_documents", &collection, None, e))?;
        Ok(pairs
            .into_iter()
            .map(|(id, fields)| Document::new(id, fields))
            .collect())
    }

    /// Apply a sequence of write operations as a single atomic unit:
    /// either all become visible together, or none are applied.
    pub async fn batch_operation(&self, operations: Vec<BatchOperation>) -> Result<()> {
        for operation in &operations {
            validate_name("collection", operation.collection())?;
            validate_name("document id", operation.id())?;
        }
        self.client
            .commit(operations)
            .await
            .map_err(|e| write_err("batch_operation", "<multiple>", None, e))
    }

    /// Commit a [`WriteBatch`] built with the fluent builder.
    pub async fn commit_batch(&self, batch: WriteBatch) -> Result<()> {
        self.batch_operation(batch.into_operations()).await
    }
}

fn read_err(operation: &'static str, collection: &str, id: Option<&str>, source: Error) -> Error {
    error!(
        operation,
        collection,
        id = id.unwrap_or("-"),
        error = %source,
        "store read failed"
    );
    Error::Read {
        operation,
        collection: collection.to_string(),
        id: id.map(String::from),
        source: Box::new(source),
    }
}

fn write_err(operation: &'static str, collection: &str, id: Option<&str>, source: Error) -> Error {
    error!(
        operation,
        collection,
        id = id.unwrap_or("-"),
        error = %source,
        "store write failed"
    );
    Error::Write {
        operation,
        collection: collection.to_string(),
        id: id.map(String::from),
        source: Box::new(source),
    }
}
