//! Document store trait

use async_trait::async_trait;

use crate::{Collection, Document, Fields, Filter, StoreResult, Subscription};

/// A single operation of a batch write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create with a generated ID.
    Create {
        collection: Collection,
        fields: Fields,
    },
    /// Create under a caller-chosen ID, failing if it exists.
    Insert {
        collection: Collection,
        id: String,
        fields: Fields,
    },
    /// Merge fields into an existing document.
    Update {
        collection: Collection,
        id: String,
        fields: Fields,
    },
    /// Delete an existing document.
    Delete { collection: Collection, id: String },
}

/// Trait for document storage operations
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lists documents of a collection matching the filter, ordered by ID
    async fn find(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Document>>;

    /// Gets a document by ID
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;

    /// Creates a document under a generated ID and returns the ID
    async fn create(&self, collection: Collection, fields: Fields) -> StoreResult<String>;

    /// Creates a document under `id`, failing with `AlreadyExists` if taken
    async fn insert(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()>;

    /// Merges top-level fields into an existing document
    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()>;

    /// Deletes a document
    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()>;

    /// Subscribes to changes of documents matching the filter
    fn subscribe(&self, collection: Collection, filter: Filter) -> Subscription;

    /// Applies each operation in order and reports a result per operation.
    ///
    /// The batch is not atomic: a failed operation does not undo the ones
    /// before it, and later operations still run.
    async fn batch_write(&self, ops: Vec<WriteOp>) -> Vec<StoreResult<String>> {
        let mut results = Vec::with_capacity(ops.len());
        for op in ops {
            let result = match op {
                WriteOp::Create { collection, fields } => self.create(collection, fields).await,
                WriteOp::Insert {
                    collection,
                    id,
                    fields,
                } => self.insert(collection, &id, fields).await.map(|()| id),
                WriteOp::Update {
                    collection,
                    id,
                    fields,
                } => self.update(collection, &id, fields).await.map(|()| id),
                WriteOp::Delete { collection, id } => {
                    self.delete(collection, &id).await.map(|()| id)
                }
            };
            results.push(result);
        }
        results
    }
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    async fn find(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Document>> {
        (**self).find(collection, filter).await
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        (**self).get(collection, id).await
    }

    async fn create(&self, collection: Collection, fields: Fields) -> StoreResult<String> {
        (**self).create(collection, fields).await
    }

    async fn insert(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()> {
        (**self).insert(collection, id, fields).await
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()> {
        (**self).update(collection, id, fields).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        (**self).delete(collection, id).await
    }

    fn subscribe(&self, collection: Collection, filter: Filter) -> Subscription {
        (**self).subscribe(collection, filter)
    }

    async fn batch_write(&self, ops: Vec<WriteOp>) -> Vec<StoreResult<String>> {
        (**self).batch_write(ops).await
    }
}
