//! AcornDB Rust Client SDK
//!
//! A client for AcornDB, a hosted document database. The crate centers
//! on [`DocumentStore`], a store-agnostic CRUD/query/batch facade over
//! a pluggable [`StoreClient`]; a native TCP client and an in-process
//! client ship with it.
//!
//! # Example
//!
//! ```no_run
//! use acorndb::{DocumentStore, QueryOptions, SortDirection, StoreConfig, field};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> acorndb::Result<()> {
//!     // Connect with an end-user credential
//!     let config = StoreConfig::new("localhost", 8484, "my-project")
//!         .with_api_key("public-api-key");
//!     let store = DocumentStore::connect(&config).await?;
//!
//!     // Insert a document with a generated id
//!     let id = store.add_document("users", json!({
//!         "name": "Alice",
//!         "email": "alice@example.com"
//!     })).await?;
//!
//!     // Read it back; the id is merged into the fields
//!     let user = store.get_document("users", &id).await?;
//!     println!("User: {:?}", user);
//!
//!     // Query: conditions are conjunctive, sort applies after filters
//!     let admins = store.query_documents(
//!         "users",
//!         vec![field("role").eq("admin")],
//!         QueryOptions::new().order_by("name", SortDirection::Ascending).limit(10),
//!     ).await?;
//!     println!("Admins: {:?}", admins);
//!
//!     Ok(())
//! }
//! ```

mod batch;
mod client;
mod config;
mod document;
mod error;
mod memory;
pub mod protocol;
mod query;
mod remote;
mod store;

pub use batch::{BatchOperation, WriteBatch};
pub use client::StoreClient;
pub use config::{Credentials, StoreConfig, DEFAULT_PORT};
pub use document::{Document, ID_FIELD};
pub use error::{Error, Result};
pub use memory::MemoryClient;
pub use query::{
  field, Condition, Field, FieldOp, QueryOptions, QuerySpec, SortDirection, SortSpec,
};
pub use remote::RemoteClient;
pub use store::DocumentStore;
