//! Basic example demonstrating the AcornDB document store facade.
//!
//! Runs against the in-process store so it works without a server; swap
//! `DocumentStore::in_memory()` for `DocumentStore::connect(&config)` to
//! talk to a hosted deployment.

use acorndb::{field, DocumentStore, QueryOptions, SortDirection, WriteBatch};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> acorndb::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let store = DocumentStore::in_memory();

  // Add a document with an auto-generated id
  let user_id = store
    .add_document(
      "users",
      json!({
          "name": "John Doe",
          "email": "john@example.com",
          "role": "user"
      }),
    )
    .await?;
  println!("User created with ID: {}", user_id);

  // Set a document with a specific id
  store
    .set_document(
      "products",
      "prod-123",
      json!({
          "name": "Product 1",
          "price": 99.99,
          "inStock": true,
          "categories": ["electronics", "gadgets"]
      }),
    )
    .await?;
  println!("Product created with ID: prod-123");

  // Fetch the user we just created
  let user = store.get_document("users", &user_id).await?;
  println!("User data: {:?}", user);

  // Update a document (fails if it does not exist)
  store
    .update_document("users", &user_id, json!({"role": "admin"}))
    .await?;
  println!("User {} updated successfully", user_id);

  // Query products in a category, cheapest first
  let products = store
    .query_documents(
      "products",
      vec![field("categories").contains("electronics")],
      QueryOptions::new().order_by("price", SortDirection::Ascending),
    )
    .await?;
  println!("Products in category electronics: {:?}", products);

  // Batch: all-or-nothing
  store
    .commit_batch(
      WriteBatch::new()
        .set("products", "prod-456", json!({"name": "Product 2", "price": 149.99}))
        .update("products", "prod-123", json!({"inStock": false})),
    )
    .await?;
  println!("Batch committed");

  // Delete a document (idempotent)
  store.delete_document("products", "prod-123").await?;
  store.delete_document("products", "prod-123").await?;
  println!("Product prod-123 deleted");

  Ok(())
}
