//! In-memory document store
//!
//! Behaves like a single ArangoDB database with a unique primary index per
//! collection. Used by tests and by `run --dry-run`.

use super::{document_key, Batch, DocumentStore, StoreError, StoreResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Default)]
struct MemoryCollection {
    documents: BTreeMap<String, Value>,
    fulltext_fields: BTreeSet<String>,
}

/// Document store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a collection's documents ordered by key
    pub fn documents(&self, name: &str) -> Vec<Value> {
        self.collections
            .read()
            .get(name)
            .map(|c| c.documents.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Single document by key
    pub fn document(&self, name: &str, key: &str) -> Option<Value> {
        self.collections
            .read()
            .get(name)
            .and_then(|c| c.documents.get(key).cloned())
    }

    /// Whether the collection exists
    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.read().contains_key(name)
    }

    /// Fields carrying a full-text index
    pub fn fulltext_fields(&self, name: &str) -> Vec<String> {
        self.collections
            .read()
            .get(name)
            .map(|c| c.fulltext_fields.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Check that every document can be inserted, without inserting anything
fn validate_batch(collection: &MemoryCollection, name: &str, documents: &[Value]) -> StoreResult<()> {
    let mut seen = BTreeSet::new();
    for doc in documents {
        let key = document_key(doc).ok_or_else(|| StoreError::MissingKey(name.to_string()))?;
        if collection.documents.contains_key(key) || !seen.insert(key) {
            return Err(StoreError::DuplicateKey {
                collection: name.to_string(),
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

fn apply_batch(collection: &mut MemoryCollection, documents: &[Value]) {
    for doc in documents {
        if let Some(key) = document_key(doc) {
            collection.documents.insert(key.to_string(), doc.clone());
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_collection(&self, name: &str) -> StoreResult<bool> {
        let mut collections = self.collections.write();
        if collections.contains_key(name) {
            return Ok(false);
        }
        collections.insert(name.to_string(), MemoryCollection::default());
        Ok(true)
    }

    async fn truncate(&self, name: &str) -> StoreResult<()> {
        let mut collections = self.collections.write();
        let collection = collections
            .get_mut(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))?;
        collection.documents.clear();
        Ok(())
    }

    async fn all(&self, name: &str) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read();
        let collection = collections
            .get(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))?;
        Ok(collection.documents.values().cloned().collect())
    }

    async fn get_many(&self, name: &str, keys: &[String]) -> StoreResult<HashMap<String, Value>> {
        let collections = self.collections.read();
        let collection = collections
            .get(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))?;
        Ok(keys
            .iter()
            .filter_map(|k| collection.documents.get(k).map(|d| (k.clone(), d.clone())))
            .collect())
    }

    async fn insert(&self, name: &str, document: &Value) -> StoreResult<()> {
        self.import(name, std::slice::from_ref(document)).await.map(|_| ())
    }

    async fn import(&self, name: &str, documents: &[Value]) -> StoreResult<usize> {
        let mut collections = self.collections.write();
        let collection = collections
            .get_mut(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))?;
        validate_batch(collection, name, documents)?;
        apply_batch(collection, documents);
        Ok(documents.len())
    }

    async fn import_paired(&self, entities: Batch<'_>, lookups: Batch<'_>) -> StoreResult<(usize, usize)> {
        let mut collections = self.collections.write();

        // Validate both batches before touching either collection
        for batch in [&entities, &lookups] {
            let collection = collections
                .get(batch.collection)
                .ok_or_else(|| StoreError::CollectionNotFound(batch.collection.to_string()))?;
            validate_batch(collection, batch.collection, batch.documents)?;
        }
        if entities.collection == lookups.collection {
            let mut combined = entities.documents.to_vec();
            combined.extend_from_slice(lookups.documents);
            validate_batch(&MemoryCollection::default(), entities.collection, &combined)?;
        }

        for batch in [&entities, &lookups] {
            if let Some(collection) = collections.get_mut(batch.collection) {
                apply_batch(collection, batch.documents);
            }
        }
        Ok((entities.documents.len(), lookups.documents.len()))
    }

    async fn ensure_fulltext_index(&self, name: &str, field: &str) -> StoreResult<()> {
        let mut collections = self.collections.write();
        let collection = collections
            .get_mut(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))?;
        collection.fulltext_fields.insert(field.to_string());
        Ok(())
    }

    async fn count(&self, name: &str) -> StoreResult<u64> {
        let collections = self.collections.read();
        let collection = collections
            .get(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))?;
        Ok(collection.documents.len() as u64)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn ensure_collection_reports_creation_once() {
        let store = MemoryStore::new();
        assert!(store.ensure_collection("City").await.unwrap());
        assert!(!store.ensure_collection("City").await.unwrap());
    }

    #[tokio::test]
    async fn import_rejects_duplicate_keys_without_partial_writes() {
        let store = MemoryStore::new();
        store.ensure_collection("City").await.unwrap();
        let docs = vec![json!({"_key": "1"}), json!({"_key": "2"}), json!({"_key": "1"})];

        let err = store.import("City", &docs).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { ref key, .. } if key == "1"));
        assert_eq!(store.count("City").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn operations_on_missing_collection_fail() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.all("Nope").await,
            Err(StoreError::CollectionNotFound(_))
        ));
        assert!(store.truncate("Nope").await.is_err());
    }

    #[tokio::test]
    async fn import_paired_is_all_or_nothing() {
        let store = MemoryStore::new();
        store.ensure_collection("PartoHotel").await.unwrap();
        store.ensure_collection("HotelLookup").await.unwrap();
        store.insert("HotelLookup", &json!({"_key": "9"})).await.unwrap();

        let hotels = vec![json!({"_key": "100"})];
        let lookups = vec![json!({"_key": "9"})];
        let result = store
            .import_paired(Batch::new("PartoHotel", &hotels), Batch::new("HotelLookup", &lookups))
            .await;

        assert!(result.is_err());
        assert_eq!(store.count("PartoHotel").await.unwrap(), 0);
        assert_eq!(store.count("HotelLookup").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn get_many_skips_missing_keys() {
        let store = MemoryStore::new();
        store.ensure_collection("PartoHotelCity").await.unwrap();
        store
            .import("PartoHotelCity", &[json!({"_key": "1", "Name": "Dubai"})])
            .await
            .unwrap();

        let found = store
            .get_many("PartoHotelCity", &["1".to_string(), "2".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found["1"]["Name"], json!("Dubai"));
    }

    #[tokio::test]
    async fn truncate_keeps_indexes() {
        let store = MemoryStore::new();
        store.ensure_collection("HotelLookup").await.unwrap();
        store.ensure_fulltext_index("HotelLookup", "Fulltext").await.unwrap();
        store.insert("HotelLookup", &json!({"_key": "1"})).await.unwrap();
        store.truncate("HotelLookup").await.unwrap();

        assert_eq!(store.count("HotelLookup").await.unwrap(), 0);
        assert_eq!(store.fulltext_fields("HotelLookup"), vec!["Fulltext".to_string()]);
    }
}
