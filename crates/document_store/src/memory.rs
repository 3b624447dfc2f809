//! In-memory document store implementation.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    ChangeFeed, ChangeKind, Collection, Document, DocumentStore, DocumentStoreError, Fields,
    Filter, StoreResult, Subscription,
};

/// In-memory document store for tests and single-process use.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, Fields>>>,
    feed: ChangeFeed,
}

impl MemoryDocumentStore {
    /// Creates a new in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents in a collection.
    pub async fn len(&self, collection: Collection) -> usize {
        let collections = self.collections.read().await;
        collections.get(&collection).map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(&collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .filter(|doc| filter.matches(doc))
            .collect())
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn create(&self, collection: Collection, fields: Fields) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        self.insert(collection, &id, fields).await?;
        Ok(id)
    }

    async fn insert(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()> {
        let doc = Document::new(id, fields);
        {
            let mut collections = self.collections.write().await;
            let docs = collections.entry(collection).or_default();
            if docs.contains_key(id) {
                return Err(DocumentStoreError::already_exists(collection, id));
            }
            docs.insert(doc.id.clone(), doc.fields.clone());
        }
        self.feed.publish(ChangeKind::Created, collection, doc);
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()> {
        let doc = {
            let mut collections = self.collections.write().await;
            let stored = collections
                .get_mut(&collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| DocumentStoreError::not_found(collection, id))?;
            for (key, value) in fields {
                if key != "id" {
                    stored.insert(key, value);
                }
            }
            Document::new(id, stored.clone())
        };
        self.feed.publish(ChangeKind::Updated, collection, doc);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let fields = {
            let mut collections = self.collections.write().await;
            collections
                .get_mut(&collection)
                .and_then(|docs| docs.remove(id))
                .ok_or_else(|| DocumentStoreError::not_found(collection, id))?
        };
        self.feed
            .publish(ChangeKind::Deleted, collection, Document::new(id, fields));
        Ok(())
    }

    fn subscribe(&self, collection: Collection, filter: Filter) -> Subscription {
        self.feed.subscribe(collection, filter)
    }
}
