//! Document store abstraction
//!
//! The importer talks to storage through [`DocumentStore`], a small
//! collection-oriented interface over JSON documents addressed by `_key`.
//!
//! - **ArangoDB** ([`ArangoStore`]): HTTP API client used for real runs
//! - **Memory** ([`MemoryStore`]): in-process store for tests and dry runs

mod arango;
mod memory;

pub use arango::ArangoStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;

/// Errors raised by a document store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Network or HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected a request
    #[error("Database error ({status}, code {code}): {message}")]
    Api {
        status: u16,
        code: i64,
        message: String,
    },

    /// A collection that must exist does not
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// A document with the same key already exists
    #[error("Duplicate key '{key}' in collection {collection}")]
    DuplicateKey { collection: String, key: String },

    /// A document lacks a usable `_key`
    #[error("Document in collection {0} has no string _key")]
    MissingKey(String),

    /// Stream transaction could not be started, committed or aborted
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Client construction error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A batch of documents bound for one collection
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    pub collection: &'a str,
    pub documents: &'a [Value],
}

impl<'a> Batch<'a> {
    pub fn new(collection: &'a str, documents: &'a [Value]) -> Self {
        Self {
            collection,
            documents,
        }
    }
}

/// Collection-oriented JSON document store
///
/// The trait is object-safe so the pipeline can hold an `Arc<dyn DocumentStore>`.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Create the collection if it does not exist. Returns true if created.
    async fn ensure_collection(&self, name: &str) -> StoreResult<bool>;

    /// Remove every document from a collection
    async fn truncate(&self, name: &str) -> StoreResult<()>;

    /// All documents of a collection
    async fn all(&self, name: &str) -> StoreResult<Vec<Value>>;

    /// Documents for the given keys; keys with no document are absent from the map
    async fn get_many(&self, name: &str, keys: &[String]) -> StoreResult<HashMap<String, Value>>;

    /// Insert a single document
    async fn insert(&self, name: &str, document: &Value) -> StoreResult<()>;

    /// Bulk insert; fails on the first rejected document. Returns the number inserted.
    async fn import(&self, name: &str, documents: &[Value]) -> StoreResult<usize>;

    /// Bulk insert an entity batch followed by its lookup batch.
    ///
    /// The default runs two independent imports, so a failure in the second
    /// leaves the first committed. Backends with transactions override this
    /// to commit both batches or neither.
    async fn import_paired(&self, entities: Batch<'_>, lookups: Batch<'_>) -> StoreResult<(usize, usize)> {
        let entity_count = self.import(entities.collection, entities.documents).await?;
        let lookup_count = self.import(lookups.collection, lookups.documents).await?;
        Ok((entity_count, lookup_count))
    }

    /// Create a full-text index on `field` unless an identical one exists
    async fn ensure_fulltext_index(&self, name: &str, field: &str) -> StoreResult<()>;

    /// Number of documents in a collection
    async fn count(&self, name: &str) -> StoreResult<u64>;

    /// Backend name (e.g., "arangodb", "memory")
    fn name(&self) -> &str;
}

/// Fetch and deserialize every document of a collection
pub async fn fetch_all<T: DeserializeOwned>(store: &dyn DocumentStore, name: &str) -> StoreResult<Vec<T>> {
    store
        .all(name)
        .await?
        .into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
        .collect()
}

/// Serialize records into store documents
pub fn to_documents<T: Serialize>(records: &[T]) -> StoreResult<Vec<Value>> {
    records
        .iter()
        .map(|r| serde_json::to_value(r).map_err(StoreError::from))
        .collect()
}

/// The `_key` of a document, if it has a string key
pub fn document_key(document: &Value) -> Option<&str> {
    document.get("_key").and_then(Value::as_str)
}
